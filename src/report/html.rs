//! HTML rendering.
//!
//! The page is a single self-contained file. Static markup carries
//! `data-i18n` keys that the page script fills from the embedded text
//! tables, so switching language never needs a reload. Everything derived
//! from the results file is escaped before it is placed in markup.

use super::format::{MISSING, format_delta, format_latency_ms, format_rate};
use super::payload::ReportPayload;
use crate::config::{ReportOptions, Server};
use crate::error::ReportError;
use crate::insight::Insight;
use crate::record::{BenchmarkRecord, endpoint_display};
use crate::run_config::{RunConfig, format_duration_display};
use crate::texts::{Lang, TextCatalog};
use crate::warnings::ZeroMetricWarning;
use serde::Serialize;
use std::fmt::Write;

const PLOTLY_URL: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";
const KATEX_VERSION: &str = "0.16.9";

/// Escape text for use in HTML element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serialize a value as JSON that is safe to embed in a `<script>` block.
///
/// `<` only ever appears inside JSON strings, where `\u003c` is an
/// equivalent escape, so no `</script>` sequence can survive.
pub fn script_json<T: Serialize>(value: &T) -> Result<String, ReportError> {
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}

/// Render the complete report page.
pub fn render(
    payload: &ReportPayload,
    catalog: &TextCatalog,
    options: &ReportOptions,
) -> Result<String, ReportError> {
    let payload_json = script_json(payload)?;
    let texts_json = script_json(&catalog.by_code())?;
    let defaults_json = script_json(&serde_json::json!({
        "lang": options.default_lang.code(),
        "theme": options.default_theme.as_str(),
    }))?;

    let default_texts = catalog.get(options.default_lang);
    let header = header_section(payload);
    let parameters = parameters_section(&payload.run_config);
    let warnings = warnings_section(&payload.warnings, catalog, payload.run_config.connections);
    let insights = insights_table(&payload.insights, &payload.servers);
    let raw = raw_results_section(&payload.rows, &payload.servers);

    Ok(format!(
        r##"<!DOCTYPE html>
<html lang="{html_lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{PLOTLY_URL}"></script>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/katex@{KATEX_VERSION}/dist/katex.min.css">
    <script defer src="https://cdn.jsdelivr.net/npm/katex@{KATEX_VERSION}/dist/katex.min.js"></script>
    <script defer src="https://cdn.jsdelivr.net/npm/katex@{KATEX_VERSION}/dist/contrib/auto-render.min.js"></script>
    <style>{STYLE}</style>
</head>
<body>
  <div class="container">
{header}
{endpoints}
{parameters}
{formulas}
{warnings}
{charts}
{insights}
{interpretation}
{raw}
{footer}
  </div>

  <script>
    const payload = {payload_json};
    const TEXTS = {texts_json};
    const DEFAULTS = {defaults_json};
  </script>
  <script>{SCRIPT}</script>
</body>
</html>
"##,
        html_lang = escape_html(&default_texts.lang),
        title = escape_html(&default_texts.title),
        endpoints = ENDPOINTS_SECTION,
        formulas = FORMULAS_SECTION,
        charts = CHARTS_GRID,
        interpretation = INTERPRETATION_SECTION,
        footer = FOOTER,
    ))
}

fn card(i18n_title: &str, body: &str) -> String {
    classed_card("card", i18n_title, body)
}

fn classed_card(class: &str, i18n_title: &str, body: &str) -> String {
    format!(
        r##"    <div class="{class}">
      <div class="card-head">
        <h2 data-i18n="{i18n_title}"></h2>
        <button class="collapse-btn" type="button">&#9660;</button>
      </div>
      <div class="card-content">
{body}
      </div>
    </div>"##
    )
}

fn header_section(payload: &ReportPayload) -> String {
    let mut meta = format!(
        r##"<span data-i18n="meta_generated"></span>: <span id="meta-generated">{}</span>
        &middot; <span data-i18n="meta_source"></span>: <code>{}</code>"##,
        escape_html(&payload.meta.generated_at),
        escape_html(&payload.meta.source),
    );
    if let Some(test_time) = &payload.meta.test_time {
        let _ = write!(
            meta,
            r##"
        &middot; <span data-i18n="meta_test_time"></span>: {}"##,
            escape_html(test_time)
        );
    }

    let buttons: String = Lang::ALL
        .iter()
        .map(|lang| {
            let name = match lang {
                Lang::En => "EN",
                Lang::Zh => "中文",
            };
            format!(
                r##"<button class="lang-btn" type="button" data-lang="{}">{}</button>"##,
                lang.code(),
                name
            )
        })
        .collect();

    format!(
        r##"    <header>
      <div>
        <h1 data-i18n="title"></h1>
        <p class="meta">{meta}</p>
      </div>
      <div class="lang-switch">{buttons}</div>
    </header>"##
    )
}

/// The run parameter card. Durations are shown in human units.
pub fn parameters_section(config: &RunConfig) -> String {
    let params = &config.endpoint_params;
    let items = [
        ("param_duration", format_duration_display(config.duration)),
        (
            "param_per_endpoint",
            format_duration_display(config.per_endpoint_duration),
        ),
        ("param_connections", config.connections.to_string()),
        ("param_cpu_iterations", params.cpu.iterations.to_string()),
        ("param_json_items", params.json.items.to_string()),
        ("param_io_size", params.io.size.to_string()),
        ("param_io_iterations", params.io.iterations.to_string()),
        ("param_io_mode", escape_html(&params.io.mode)),
    ];

    let mut body = String::from("        <div class=\"params\">\n");
    for (key, value) in items {
        let _ = writeln!(
            body,
            r##"          <div class="param"><span data-i18n="{key}"></span><strong>{value}</strong></div>"##
        );
    }
    body.push_str("        </div>");

    card("params_title", &body)
}

/// The data warnings card, or nothing when there are no warnings. Each
/// language gets its own list; the page script shows the active one.
pub fn warnings_section(
    warnings: &[ZeroMetricWarning],
    catalog: &TextCatalog,
    connections: u64,
) -> String {
    if warnings.is_empty() {
        return String::new();
    }

    let mut body = String::from("        <p class=\"desc\" data-i18n=\"warnings_intro\"></p>\n");
    for lang in Lang::ALL {
        let texts = catalog.get(lang);
        let _ = writeln!(
            body,
            r##"        <ul class="warning-list lang-block" data-lang="{}">"##,
            lang.code()
        );
        for warning in warnings {
            let lines = warning.describe(texts, connections);
            let _ = writeln!(
                body,
                "          <li><strong>{} / {}</strong>: {}</li>",
                escape_html(&warning.server_label),
                escape_html(&warning.endpoint),
                escape_html(&lines.join(" "))
            );
        }
        body.push_str("        </ul>\n");
    }

    classed_card("card warning-card", "warnings_title", &body)
}

fn winner_label(winner: &str, servers: &[Server]) -> String {
    servers
        .iter()
        .find(|s| s.id == winner)
        .map(|s| escape_html(&s.label))
        .unwrap_or_else(|| escape_html(winner))
}

pub fn insights_table(insights: &[Insight], servers: &[Server]) -> String {
    let mut rows = String::new();
    for insight in insights {
        let _ = writeln!(
            rows,
            "            <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&endpoint_display(&insight.endpoint)),
            winner_label(insight.req_winner.as_str(), servers),
            format_delta(insight.req_delta),
            winner_label(insight.lat_winner.as_str(), servers),
            format_delta(insight.lat_delta),
        );
    }

    let body = format!(
        r##"        <table>
          <thead>
            <tr>
              <th data-i18n="th_endpoint"></th>
              <th data-i18n="th_winner_throughput"></th>
              <th data-i18n="th_delta"></th>
              <th data-i18n="th_winner_latency"></th>
              <th data-i18n="th_latency_delta"></th>
            </tr>
          </thead>
          <tbody>
{rows}          </tbody>
        </table>"##
    );
    card("insights_title", &body)
}

/// A raw results cell for a metric that must not be shown as a plain zero.
fn metric_cell(value: f64, text: &str) -> String {
    if value == 0.0 {
        format!(r##"<td class="metric-warning" title="0">{MISSING}</td>"##)
    } else {
        format!("<td>{}</td>", escape_html(text))
    }
}

/// A latency cell showing the verbatim value with the normalized one as a
/// tooltip.
fn latency_cell(raw: &str, ms: Option<f64>) -> String {
    match ms {
        Some(ms) => format!(
            r##"<td title="{}">{}</td>"##,
            format_latency_ms(ms),
            escape_html(raw)
        ),
        None if raw.is_empty() => format!("<td>{MISSING}</td>"),
        None => format!("<td>{}</td>", escape_html(raw)),
    }
}

/// One table per compared server. Zero throughput or transfer cells are
/// flagged rather than printed as `0.00`.
pub fn raw_results_section(records: &[BenchmarkRecord], servers: &[Server]) -> String {
    let mut body = String::new();
    for server in servers {
        let mut rows = String::new();
        for r in records.iter().filter(|r| r.server == server.id) {
            let _ = writeln!(
                rows,
                "              <tr><td>{}</td><td>{}</td>{}{}{}{}{}{}</tr>",
                escape_html(&endpoint_display(&r.endpoint)),
                escape_html(&r.timestamp),
                metric_cell(r.requests_sec, &format_rate(r.requests_sec)),
                latency_cell(&r.latency_avg, Some(r.latency_ms)),
                latency_cell(&r.latency_p50, r.latency_p50_ms),
                latency_cell(&r.latency_p90, r.latency_p90_ms),
                latency_cell(&r.latency_p99, r.latency_p99_ms),
                metric_cell(r.transfer_kb_sec, &r.transfer_sec),
            );
        }

        let _ = write!(
            body,
            r##"        <div class="server-results">
          <h3 style="color: {color};">{label}</h3>
          <table>
            <thead>
              <tr>
                <th data-i18n="th_endpoint"></th>
                <th data-i18n="th_timestamp"></th>
                <th data-i18n="th_req"></th>
                <th data-i18n="th_latency"></th>
                <th data-i18n="th_p50"></th>
                <th data-i18n="th_p90"></th>
                <th data-i18n="th_p99"></th>
                <th data-i18n="th_transfer"></th>
              </tr>
            </thead>
            <tbody>
{rows}            </tbody>
          </table>
        </div>
"##,
            color = escape_html(&server.color),
            label = escape_html(&server.label),
        );
    }
    card("raw_title", body.trim_end())
}

const ENDPOINTS_SECTION: &str = r##"    <div class="card">
      <div class="card-head">
        <h2 data-i18n="endpoints_title"></h2>
        <button class="collapse-btn" type="button">&#9660;</button>
      </div>
      <div class="card-content">
        <p class="desc" data-i18n="endpoints_intro"></p>
        <div class="endpoint-list">
          <div class="endpoint" style="border-color: #f2b264;">
            <h3 style="color: #f2b264;" data-i18n="endpoint_cpu_title"></h3>
            <p data-i18n="endpoint_cpu_desc"></p>
          </div>
          <div class="endpoint" style="border-color: #6dd3b6;">
            <h3 style="color: #6dd3b6;" data-i18n="endpoint_io_title"></h3>
            <p data-i18n="endpoint_io_desc"></p>
          </div>
          <div class="endpoint" style="border-color: #a7c8c2;">
            <h3 style="color: #a7c8c2;" data-i18n="endpoint_json_title"></h3>
            <p data-i18n="endpoint_json_desc"></p>
          </div>
        </div>
      </div>
    </div>"##;

const FORMULAS_SECTION: &str = r##"    <div class="card">
      <div class="card-head">
        <h2 data-i18n="formulas_title"></h2>
        <button class="collapse-btn" type="button">&#9660;</button>
      </div>
      <div class="card-content">
        <ul class="formula">
          <li data-i18n="formula_throughput"></li>
          <li data-i18n="formula_percentile"></li>
          <li data-i18n="formula_delta"></li>
        </ul>
      </div>
    </div>"##;

const CHARTS_GRID: &str = r##"    <div class="grid">
      <div class="card">
        <h2 data-i18n="chart_requests"></h2>
        <p class="desc" data-i18n="desc_requests"></p>
        <div id="chart-req" class="plot"></div>
      </div>
      <div class="card">
        <h2 data-i18n="chart_latency"></h2>
        <p class="desc" data-i18n="desc_latency"></p>
        <div id="chart-lat" class="plot"></div>
      </div>
      <div class="card">
        <h2 data-i18n="chart_transfer"></h2>
        <p class="desc" data-i18n="desc_transfer"></p>
        <div id="chart-xfer" class="plot"></div>
      </div>
      <div class="card">
        <h2 data-i18n="chart_pctl"></h2>
        <p class="desc" data-i18n="desc_pctl"></p>
        <div id="chart-pctl" class="plot"></div>
        <p class="desc" id="pctl-note"></p>
      </div>
      <div class="card">
        <h2 data-i18n="chart_dist"></h2>
        <p class="desc" data-i18n="desc_dist"></p>
        <div id="chart-hist" class="plot"></div>
      </div>
      <div class="card">
        <h2 data-i18n="chart_delta"></h2>
        <p class="desc" data-i18n="desc_delta"></p>
        <div id="chart-delta" class="plot"></div>
      </div>
    </div>"##;

const INTERPRETATION_SECTION: &str = r##"    <div class="card callout">
      <p><strong data-i18n="interp_intro"></strong></p>
    </div>
    <div class="card">
      <div class="card-head">
        <h2 data-i18n="interpretation_title"></h2>
        <button class="collapse-btn" type="button">&#9660;</button>
      </div>
      <div class="card-content">
        <ul class="interpretation" id="interpretation-list"></ul>
      </div>
    </div>"##;

const FOOTER: &str = r##"    <footer>
      <span data-i18n="theme_label"></span>
      <button class="theme-btn" type="button" data-theme="default" data-i18n="theme_default"></button>
      <button class="theme-btn" type="button" data-theme="light" data-i18n="theme_light"></button>
      <button class="theme-btn" type="button" data-theme="dark" data-i18n="theme_dark"></button>
    </footer>"##;

const STYLE: &str = r##"
    :root {
      --bg: #0f2a2e;
      --card: #153a3f;
      --border: rgba(167, 200, 194, 0.25);
      --text: #e7f4f2;
      --muted: #a7c8c2;
      --accent: #f2b264;
      --warn: #ff8a65;
    }
    body.light-theme {
      --bg: #f5f7f7;
      --card: #ffffff;
      --border: #d8e0df;
      --text: #1a1a1a;
      --muted: #5b6b69;
    }
    body.dark-theme {
      --bg: #121212;
      --card: #1e1e1e;
      --border: #333333;
      --text: #d0d0d0;
      --muted: #9a9a9a;
    }
    * { box-sizing: border-box; }
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Noto Sans TC', sans-serif;
      margin: 0;
      padding: 24px;
      background: var(--bg);
      color: var(--text);
    }
    .container { max-width: 1400px; margin: 0 auto; }
    header { display: flex; justify-content: space-between; align-items: flex-start; margin-bottom: 16px; }
    h1 { margin: 0 0 6px 0; }
    h2 { margin: 0 0 12px 0; font-size: 18px; }
    .meta { color: var(--muted); font-size: 13px; margin: 0; }
    .card {
      background: var(--card);
      border: 1px solid var(--border);
      border-radius: 10px;
      padding: 16px;
      margin-bottom: 16px;
    }
    .card-head { display: flex; justify-content: space-between; align-items: flex-start; }
    .collapse-btn { background: none; border: none; color: var(--muted); cursor: pointer; font-size: 12px; }
    .desc { color: var(--muted); font-size: 13px; line-height: 1.6; }
    .grid { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
    @media (max-width: 900px) { .grid { grid-template-columns: 1fr; } }
    .plot { width: 100%; height: 360px; }
    .endpoint-list { display: grid; gap: 12px; }
    .endpoint { border-left: 4px solid; padding: 8px 12px; }
    .endpoint h3 { margin: 0 0 6px 0; font-size: 14px; }
    .endpoint p { margin: 0; font-size: 13px; color: var(--muted); line-height: 1.6; }
    .params { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 12px; }
    .param { display: flex; flex-direction: column; gap: 4px; font-size: 13px; color: var(--muted); }
    .param strong { color: var(--text); font-size: 16px; }
    .warning-card { border-color: var(--warn); }
    .warning-list li { margin-bottom: 6px; line-height: 1.6; }
    .callout { background: rgba(242, 178, 100, 0.15); border-color: rgba(242, 178, 100, 0.3); color: var(--accent); }
    .callout p { margin: 0; }
    table { width: 100%; border-collapse: collapse; font-size: 13px; }
    th, td { padding: 8px 10px; text-align: right; border-bottom: 1px solid var(--border); }
    th:first-child, td:first-child { text-align: left; }
    .metric-warning { color: var(--warn); font-weight: 600; }
    .server-results { margin-bottom: 24px; }
    .interpretation li { margin-bottom: 8px; line-height: 1.6; }
    .finding { color: var(--accent); }
    .lang-btn, .theme-btn {
      background: none;
      border: 1px solid var(--border);
      color: var(--text);
      border-radius: 6px;
      padding: 4px 10px;
      cursor: pointer;
    }
    .lang-btn.active, .theme-btn.active { background: var(--accent); color: #1a1a1a; }
    footer { display: flex; gap: 8px; align-items: center; justify-content: center; color: var(--muted); }
"##;

const SCRIPT: &str = r##"
    const servers = payload.servers;
    const transparent = { paper_bgcolor: 'rgba(0,0,0,0)', plot_bgcolor: 'rgba(0,0,0,0)' };
    let fontColor = '#e7f4f2';

    function escapeHtml(s) {
      return String(s)
        .replace(/&/g, '&amp;')
        .replace(/</g, '&lt;')
        .replace(/>/g, '&gt;')
        .replace(/"/g, '&quot;');
    }

    function rgba(hex, alpha) {
      const v = parseInt(hex.replace('#', ''), 16);
      return `rgba(${(v >> 16) & 255},${(v >> 8) & 255},${v & 255},${alpha})`;
    }

    function layout(extra) {
      return Object.assign({}, transparent, { font: { color: fontColor }, margin: { t: 20 } }, extra || {});
    }

    function barTraces(series) {
      return servers.map((s) => ({
        type: 'bar',
        name: s.label,
        x: series.labels,
        y: series[s.id],
        marker: { color: s.color },
      }));
    }

    function drawCharts(t) {
      const charts = payload.charts;
      Plotly.react('chart-req', barTraces(charts.requests_sec), layout({ barmode: 'group' }));
      Plotly.react('chart-lat', barTraces(charts.latency_ms), layout({ barmode: 'group' }));
      Plotly.react('chart-xfer', barTraces(charts.transfer_kb_sec), layout({ barmode: 'group' }));

      const pctlEl = document.getElementById('chart-pctl');
      if (payload.has_pctl) {
        const pctl = charts.latency_pctl;
        const traces = [];
        servers.forEach((s) => {
          [['p50', 0.65], ['p90', 0.85], ['p99', 1.0]].forEach(([key, alpha]) => {
            traces.push({
              type: 'bar',
              name: `${s.label} ${key}`,
              x: pctl.labels,
              y: pctl[s.id][key],
              marker: { color: rgba(s.color, alpha) },
            });
          });
        });
        Plotly.react(pctlEl, traces, layout({ barmode: 'group' }));
      } else {
        pctlEl.innerHTML = `<div class="desc">${t.no_pctl_chart}</div>`;
      }

      const hist = servers.map((s) => ({
        type: 'violin',
        name: s.label,
        y: payload.hist_requests[s.id],
        box: { visible: true },
        meanline: { visible: true },
        fillcolor: rgba(s.color, 0.45),
        line: { color: s.color },
      }));
      Plotly.react('chart-hist', hist, layout({ yaxis: { title: t.th_req } }));

      const delta = charts.throughput_delta_pct;
      const lines = servers.map((s) => ({
        type: 'scatter',
        mode: 'lines+markers',
        name: s.label,
        x: charts.requests_sec.labels,
        y: charts.requests_sec[s.id],
        line: { color: s.color, width: 3 },
        marker: { size: 8 },
      }));
      lines.push({
        type: 'bar',
        name: 'Δ%',
        x: delta.labels,
        y: delta.values,
        yaxis: 'y2',
        opacity: 0.35,
        marker: { color: '#a7c8c2' },
      });
      Plotly.react('chart-delta', lines, layout({
        hovermode: 'x unified',
        yaxis: { title: t.th_req },
        yaxis2: { title: t.delta_yaxis, overlaying: 'y', side: 'right', ticksuffix: '%' },
      }));
    }

    function applyTheme(theme) {
      document.body.classList.remove('light-theme', 'dark-theme');
      fontColor = '#e7f4f2';
      if (theme === 'light') {
        document.body.classList.add('light-theme');
        fontColor = '#1a1a1a';
      } else if (theme === 'dark') {
        document.body.classList.add('dark-theme');
        fontColor = '#d0d0d0';
      }
      window.localStorage.setItem('report_theme', theme);
      document.querySelectorAll('.theme-btn').forEach((btn) => {
        btn.classList.toggle('active', btn.dataset.theme === theme);
      });
      drawCharts(TEXTS[currentLang()]);
    }

    function currentLang() {
      const saved = window.localStorage.getItem('report_lang');
      return TEXTS[saved] ? saved : DEFAULTS.lang;
    }

    function applyLang(lang) {
      const t = TEXTS[lang];
      document.documentElement.lang = t.lang;
      document.title = t.title;
      document.querySelectorAll('[data-i18n]').forEach((el) => {
        const key = el.dataset.i18n;
        if (t[key]) {
          el.innerHTML = t[key];
        }
      });
      document.querySelectorAll('.lang-block').forEach((el) => {
        el.style.display = el.dataset.lang === lang ? '' : 'none';
      });

      const note = document.getElementById('pctl-note');
      if (payload.has_pctl) {
        note.textContent = '';
        note.style.display = 'none';
      } else {
        note.textContent = t.pctl_missing;
        note.style.display = 'block';
      }

      document.getElementById('interpretation-list').innerHTML = payload.interpretations[lang]
        .map((item) => {
          const finding = item.finding ? ` <span class="finding">${escapeHtml(item.finding)}</span>` : '';
          return `<li><strong>${escapeHtml(item.endpoint)}</strong>: ${escapeHtml(item.text)}${finding}</li>`;
        })
        .join('');

      document.querySelectorAll('.lang-btn').forEach((btn) => {
        btn.classList.toggle('active', btn.dataset.lang === lang);
      });

      if (window.renderMathInElement) {
        renderMathInElement(document.body, {
          delimiters: [
            { left: '$$', right: '$$', display: true },
            { left: '$', right: '$', display: false },
          ],
        });
      }
      drawCharts(t);
    }

    window.addEventListener('load', () => {
      applyLang(currentLang());
      document.querySelectorAll('.lang-btn').forEach((btn) => {
        btn.addEventListener('click', () => {
          window.localStorage.setItem('report_lang', btn.dataset.lang);
          applyLang(btn.dataset.lang);
        });
      });

      applyTheme(window.localStorage.getItem('report_theme') || DEFAULTS.theme);
      document.querySelectorAll('.theme-btn').forEach((btn) => {
        btn.addEventListener('click', () => applyTheme(btn.dataset.theme));
      });

      document.querySelectorAll('.collapse-btn').forEach((btn) => {
        btn.addEventListener('click', () => {
          const content = btn.closest('.card').querySelector('.card-content');
          const hidden = content.style.display === 'none';
          content.style.display = hidden ? '' : 'none';
          btn.innerHTML = hidden ? '&#9660;' : '&#9654;';
        });
      });
    });
"##;
