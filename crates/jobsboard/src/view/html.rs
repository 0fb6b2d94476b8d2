/// Escape text for element content and double-quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const PAGE_HEAD: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Jobs</title>
  <style>
    :root {
      color-scheme: light;
      --bg: #f6f7fb;
      --panel: #ffffff;
      --border: #d7dbe6;
      --text: #1b1f2a;
      --muted: #5b6275;
      --accent: #1f6feb;
    }
    * { box-sizing: border-box; }
    body {
      margin: 0;
      font-family: "Segoe UI", "Helvetica Neue", Arial, sans-serif;
      background: var(--bg);
      color: var(--text);
    }
    header {
      padding: 20px 24px;
      border-bottom: 1px solid var(--border);
      background: var(--panel);
      display: flex;
      justify-content: space-between;
      align-items: center;
    }
    h1 { margin: 0; font-size: 20px; }
    main { padding: 16px 24px 32px; }
    .muted { color: var(--muted); font-size: 12px; }
    .table-wrap { position: relative; min-width: 900px; overflow-x: auto; }
    .loading-overlay {
      position: absolute; inset: 0; z-index: 200;
      background: rgba(255,255,255,0.6); backdrop-filter: blur(1px);
      display: flex; align-items: center; justify-content: center;
      border-radius: 4px;
    }
    table.jobs { width: 100%; table-layout: fixed; border-collapse: collapse; background: var(--panel); border: 1px solid var(--border); }
    table.jobs td, table.jobs th { padding: 14px 12px; text-align: left; vertical-align: top; overflow: hidden; text-overflow: ellipsis; }
    table.jobs tr.summary { cursor: pointer; border-top: 1px solid var(--border); }
    table.jobs tr.summary:hover { background: #eef2fb; }
    th button { all: unset; cursor: pointer; display: flex; justify-content: space-between; width: 100%; font-weight: 500; font-size: 14px; }
    .expander .expanded-content { display: none; }
    .expander .expanded-content.show { display: grid; grid-template-columns: 1fr 1fr; gap: 24px; }
    .fields td { padding: 6px 8px; }
    pre { margin: 6px 0 12px; padding: 10px; background: #0f172a; color: #e5e7eb; border-radius: 8px; font-size: 12px; overflow: auto; max-height: 200px; }
    pre.result { max-height: 500px; }
    .badge { display: inline-block; padding: 2px 10px; border-radius: 999px; font-size: 11px; font-weight: 700; text-transform: uppercase; color: #fff; }
    .badge-green { background: #2f9e44; }
    .badge-red { background: #e03131; }
    .badge-gray { background: #868e96; }
    .badge-blue { background: #1c7ed6; }
    .pagination { display: flex; justify-content: center; gap: 6px; margin-top: 16px; }
    .pagination form { margin: 0; }
    .pagination button { min-width: 32px; padding: 6px 8px; border: 1px solid var(--border); background: var(--panel); border-radius: 4px; cursor: pointer; }
    .pagination button.active { background: var(--accent); border-color: var(--accent); color: #fff; }
    .pagination button:disabled { opacity: 0.5; cursor: not-allowed; }
  </style>
</head>
<body>
"#;

const PAGE_TAIL: &str = r#"  <script>
    document.querySelectorAll("tr[data-toggle]").forEach(function (row) {
      row.addEventListener("click", async function () {
        await fetch(row.dataset.toggle, { method: "POST", redirect: "manual" });
        window.location.reload();
      });
    });
  </script>
</body>
</html>
"#;

/// Wrap a rendered table in the dashboard page.
pub fn render_page(total_count: usize, table: &str) -> String {
    let mut html = String::with_capacity(PAGE_HEAD.len() + table.len() + 512);
    html.push_str(PAGE_HEAD);
    html.push_str("  <header>\n    <h1>Jobs</h1>\n");
    html.push_str(&format!(
        "    <div><span class=\"muted\">{total_count} job(s)</span> <form method=\"post\" action=\"/ui/refresh\" style=\"display:inline\"><button>Refresh</button></form></div>\n"
    ));
    html.push_str("  </header>\n  <main>\n");
    html.push_str(table);
    html.push_str("\n  </main>\n");
    html.push_str(PAGE_TAIL);
    html
}
