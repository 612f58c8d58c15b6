//! Single-page operator console served at `/`.
//!
//! The page polls `/api/state` every 5 seconds and calls `/rpc` for each
//! operator action. All URLs are relative so the page works both at `/` and
//! under the `/pmf/` prefix.

const VERSION_PLACEHOLDER: &str = "{{VERSION}}";

const ADMIN_HTML: &str = r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8" />
  <title>Mirror Console</title>
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <style>
    :root { color-scheme: dark; }
    body { font-family: ui-sans-serif, system-ui, sans-serif; margin: 24px; background: #0b0f14; color: #e6eef7; }
    h1 { margin: 0 0 16px; font-size: 20px; }
    .card { border: 1px solid #1f2a36; border-radius: 10px; padding: 16px; margin: 14px 0; background: #111722; }
    label { font-size: 12px; color: #9fb1c7; display: block; margin-bottom: 6px; }
    input { width: 100%; border: 1px solid #273446; background: #0f1520; color: #e6eef7; padding: 10px 12px; border-radius: 8px; box-sizing: border-box; }
    .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 12px; }
    .actions { display: flex; gap: 10px; margin-top: 12px; align-items: center; }
    button { background: #155ee0; border: 0; color: white; padding: 10px 14px; border-radius: 8px; cursor: pointer; }
    button.alt { background: #263345; }
    table { width: 100%; border-collapse: collapse; margin-top: 8px; }
    th, td { text-align: left; padding: 8px 6px; border-bottom: 1px solid #1f2a36; }
    .ok { color: #6ee7b7; }
    .bad { color: #fca5a5; }
    small.mono { font-family: ui-monospace, Menlo, monospace; color: #9fb1c7; }
  </style>
</head>
<body>
  <h1>Mirror Console</h1>
  <small class="mono">Build: {{VERSION}}</small>

  <div class="card">
    <h3>Master account</h3>
    <div class="grid">
      <div><label>Label</label><input id="master_label" placeholder="Master" /></div>
      <div><label>Domain</label><input id="master_domain" placeholder="domain" /></div>
      <div><label>Credential (GSID)</label><input id="master_credential" placeholder="session token" /></div>
    </div>
    <div class="actions">
      <button id="btn_save_master">Save master</button>
      <button class="alt" id="btn_open_master">Open master</button>
    </div>
  </div>

  <div class="card">
    <h3>Followers</h3>
    <div class="grid">
      <div><label>Name</label><input id="f_name" /></div>
      <div><label>Domain</label><input id="f_domain" /></div>
      <div><label>Credential (GSID)</label><input id="f_credential" /></div>
      <div><label>Risk &times;</label><input id="f_risk" type="number" step="0.1" value="1.0" /></div>
    </div>
    <div class="actions">
      <label style="display:flex;align-items:center;gap:8px;margin:0"><input id="f_active" type="checkbox" style="width:auto" checked /> Active</label>
      <button id="btn_upsert_follower">Add / update</button>
    </div>
    <table id="followers_tbl">
      <thead><tr><th>Name</th><th>Domain</th><th>Risk&times;</th><th>Active</th><th></th></tr></thead>
      <tbody></tbody>
    </table>
  </div>

  <div class="card">
    <h3>Live link</h3>
    <div class="grid">
      <div><label>URL</label><input id="live_url" placeholder="https://..." /></div>
    </div>
    <div class="actions">
      <button id="btn_set_live">Publish</button>
      <a href="live" target="_blank" rel="noopener"><button class="alt">Open live</button></a>
      <small class="mono" id="live_status"></small>
    </div>
  </div>

  <div class="card">
    <h3>Logs</h3>
    <table id="logs_tbl">
      <thead><tr><th>When (UTC)</th><th>Account</th><th>Type</th><th>Stake</th><th>Status</th><th>Message</th></tr></thead>
      <tbody></tbody>
    </table>
  </div>

<script>
const q = s => document.querySelector(s);
const esc = s => String(s ?? '').replace(/[&<>"]/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;'}[c]));

async function rpc(params) {
  const r = await fetch('rpc?' + new URLSearchParams(params).toString());
  return r.json();
}

function row(html) { const tr = document.createElement('tr'); tr.innerHTML = html; return tr; }

async function refresh() {
  const data = await (await fetch('api/state')).json();
  const active = document.activeElement;
  if (!['master_label', 'master_domain', 'master_credential'].includes(active && active.id)) {
    q('#master_label').value = data.master.label || 'Master';
    q('#master_domain').value = data.master.domain || '';
    q('#master_credential').value = data.master.credential || '';
  }

  const fb = q('#followers_tbl tbody'); fb.innerHTML = '';
  (data.followers || []).forEach(f => {
    fb.appendChild(row(
      `<td>${esc(f.name)}</td><td>${esc(f.domain)}</td><td>${esc(f.risk_multiplier)}</td>` +
      `<td>${f.active ? '<span class="ok">yes</span>' : '<span class="bad">no</span>'}</td>` +
      `<td><button class="alt" data-del="${esc(f.name)}">Delete</button></td>`));
  });

  q('#live_status').textContent = data.live_url
    ? `published ${new Date(data.live_updated * 1000).toISOString()}`
    : 'not published';

  const lb = q('#logs_tbl tbody'); lb.innerHTML = '';
  (data.logs || []).slice(-150).reverse().forEach(l => {
    lb.appendChild(row(
      `<td>${esc(l.ts)}</td><td>${esc(l.account)}</td><td>${esc(l.type)}</td>` +
      `<td>${esc(l.stake)}</td><td>${esc(l.status)}</td><td>${esc(l.message)}</td>`));
  });
}

async function act(params, what) {
  const j = await rpc(params);
  if (!j.ok) { alert(what + ' failed: ' + (j.error || 'error')); return false; }
  await refresh();
  return true;
}

q('#btn_save_master').onclick = () => act({
  op: 'master.save',
  label: q('#master_label').value.trim() || 'Master',
  domain: q('#master_domain').value.trim(),
  credential: q('#master_credential').value.trim(),
}, 'Save');

q('#btn_open_master').onclick = () => {
  const d = q('#master_domain').value.trim();
  if (!d) return alert('Enter master domain first.');
  window.open(d.startsWith('http') ? d : 'https://' + d, '_blank', 'noopener');
};

q('#btn_upsert_follower').onclick = async () => {
  const done = await act({
    op: 'follower.upsert',
    name: q('#f_name').value.trim(),
    domain: q('#f_domain').value.trim(),
    credential: q('#f_credential').value.trim(),
    risk_multiplier: q('#f_risk').value || '1',
    active: q('#f_active').checked ? '1' : '0',
  }, 'Follower save');
  if (done) q('#f_name').value = '';
};

q('#followers_tbl').onclick = e => {
  const name = e.target?.dataset?.del;
  if (!name || !confirm(`Delete follower "${name}"?`)) return;
  act({ op: 'follower.delete', name }, 'Delete');
};

q('#btn_set_live').onclick = () => act({ op: 'live.set', url: q('#live_url').value.trim() }, 'Publish');

refresh(); setInterval(refresh, 5000);
</script>
</body>
</html>
"#;

/// Admin page with the build version filled in.
pub fn render(version: &str) -> String {
    ADMIN_HTML.replace(VERSION_PLACEHOLDER, &escape_html(version))
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}
