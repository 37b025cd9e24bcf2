//! Browser-side glue for the list and post pages

/// Theme toggle, search socket and server event handling.
///
/// Search input is sent raw on every keystroke; the server debounces it.
/// Enter submits immediately and Escape cancels. Tag clicks go over the
/// search socket with the current query flushed first; without a socket
/// they navigate to the tag link with the query attached.
pub const CLIENT_SCRIPT: &str = r#"
(function() {
    var root = document.documentElement;

    function postToGiscus(message, origin) {
        var frame = document.querySelector('iframe.giscus-frame');
        if (frame && frame.contentWindow) {
            frame.contentWindow.postMessage(message, origin);
        }
    }

    function applyTheme(theme) {
        root.setAttribute('data-theme', theme);
    }

    var toggle = document.getElementById('themeToggle');
    if (toggle) {
        toggle.addEventListener('click', function() {
            fetch('/api/theme/toggle', { method: 'POST' })
                .then(function(res) { return res.json(); })
                .then(function(body) { applyTheme(body.theme); })
                .catch(function(err) { console.error('Theme toggle failed', err); });
        });
    }

    var scheme = window.matchMedia ? window.matchMedia('(prefers-color-scheme: dark)') : null;
    if (scheme && scheme.addEventListener) {
        scheme.addEventListener('change', function(e) {
            fetch('/api/theme/system', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ theme: e.matches ? 'dark' : 'light' })
            }).catch(function() {});
        });
    }

    var events = new WebSocket('ws://' + location.host + '/__livereload');
    events.onmessage = function(msg) {
        var event;
        try { event = JSON.parse(msg.data); } catch (e) { return; }
        if (event.type === 'reload') {
            location.reload();
        } else if (event.type === 'theme') {
            applyTheme(event.theme);
            postToGiscus(event.message, event.origin);
        }
    };

    var input = document.getElementById('searchInput');
    var list = document.getElementById('postsList');
    if (!input || !list) {
        return;
    }

    var search = new WebSocket('ws://' + location.host + '/__search');
    function send(message) {
        if (search.readyState === WebSocket.OPEN) {
            search.send(JSON.stringify(message));
        }
    }

    search.onopen = function() {
        var tag = list.getAttribute('data-active-tag');
        send({ type: 'tag', tag: tag ? tag : null });
        if (input.value) {
            send({ type: 'submit', query: input.value });
        }
    };
    search.onmessage = function(msg) {
        var reply;
        try { reply = JSON.parse(msg.data); } catch (e) { return; }
        if (reply.type === 'results') {
            list.innerHTML = reply.html;
        }
    };

    function listUrl(tag, query) {
        var params = [];
        if (tag) { params.push('tag=' + encodeURIComponent(tag)); }
        if (query) { params.push('q=' + encodeURIComponent(query)); }
        return 'index.html' + (params.length ? '?' + params.join('&') : '');
    }

    function markActive(tag) {
        list.setAttribute('data-active-tag', tag);
        var buttons = document.querySelectorAll('#tagsContainer .tag-btn');
        for (var i = 0; i < buttons.length; i++) {
            var active = buttons[i].getAttribute('data-tag') === tag;
            buttons[i].classList.toggle('active', active);
        }
    }

    var tagsBar = document.getElementById('tagsContainer');
    if (tagsBar) {
        tagsBar.addEventListener('click', function(e) {
            var button = e.target.closest('.tag-btn');
            if (!button) {
                return;
            }
            e.preventDefault();
            var tag = button.getAttribute('data-tag') || '';
            if (search.readyState !== WebSocket.OPEN) {
                location.href = listUrl(tag, input.value);
                return;
            }
            send({ type: 'submit', query: input.value });
            send({ type: 'tag', tag: tag ? tag : null });
            markActive(tag);
            if (window.history && history.replaceState) {
                history.replaceState(null, '', listUrl(tag, input.value));
            }
        });
    }

    input.addEventListener('input', function(e) {
        send({ type: 'input', query: e.target.value });
    });
    input.addEventListener('keydown', function(e) {
        if (e.key === 'Enter') {
            send({ type: 'submit', query: input.value });
        } else if (e.key === 'Escape') {
            input.value = '';
            send({ type: 'cancel' });
        }
    });
})();
"#;
