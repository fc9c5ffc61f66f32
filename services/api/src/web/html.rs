//! services/api/src/web/html.rs
//!
//! Small HTML rendering helpers shared by the page handlers. The pages are
//! plain server-rendered forms; each helper returns a markup fragment and
//! `page` wraps a body in the common shell (nav, styles, probe caption).

/// Escapes text for safe interpolation into markup.
pub fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
body{font-family:system-ui,sans-serif;max-width:880px;margin:0 auto;padding:16px;color:#111}
nav a{margin-right:14px;text-decoration:none;color:#2563eb}
h1{font-size:1.5rem} h2{font-size:1.1rem;margin-top:28px}
.caption{font-size:.8rem;opacity:.65;margin:4px 0 12px}
.banner{border-radius:10px;padding:10px 14px;margin:10px 0}
.banner.error{background:#fee2e2;border:1px solid #fca5a5}
.banner.success{background:#dcfce7;border:1px solid #86efac}
.chip{display:inline-flex;align-items:center;gap:8px;padding:8px 10px;margin:6px 0;
 border-radius:999px;background:rgba(0,0,0,0.03);border:1px solid rgba(0,0,0,0.05)}
.chip .dot{width:12px;height:12px;border-radius:50%;border:1px solid rgba(0,0,0,.1)}
.cards{display:flex;gap:10px;flex-wrap:wrap}
.card{border:1px solid rgba(0,0,0,0.06);border-radius:16px;padding:14px 16px;flex:1;min-width:140px;
 background:white;box-shadow:0 1px 2px rgba(0,0,0,0.04)}
.card .t{font-size:.8rem;opacity:.7;margin-bottom:6px}
.card .v{font-weight:700;font-size:1.2rem}
.card .s{font-size:.8rem;opacity:.6}
.legend-bar{width:100%;height:10px;border-radius:8px;box-shadow:inset 0 0 0 1px rgba(0,0,0,0.06)}
.legend-ticks{display:flex;justify-content:space-between;font-size:.8rem;opacity:.75;margin-top:4px}
.bar-row{display:flex;align-items:center;gap:8px;margin:3px 0;font-size:.85rem}
.bar-row .lbl{width:140px;text-align:right;opacity:.8}
.bar-row .bar{height:14px;background:#60a5fa;border-radius:4px}
table{border-collapse:collapse;width:100%;font-size:.85rem}
th,td{border-bottom:1px solid #e5e7eb;padding:6px 8px;text-align:left}
fieldset{border:1px solid #e5e7eb;border-radius:12px;margin:14px 0;padding:12px}
label{display:block;margin:6px 0 2px;font-size:.9rem}
input[type=text],textarea,select,input[type=number]{width:100%;max-width:420px;padding:6px;
 border:1px solid #d1d5db;border-radius:8px}
.inline label{display:inline-flex;align-items:center;gap:4px;margin-right:14px}
button{background:#2563eb;color:white;border:0;border-radius:8px;padding:10px 18px;cursor:pointer}
details{margin:14px 0}
"#;

/// Wraps `body` in the common page shell.
pub fn page(title: &str, probe_caption: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en"><head><meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title><style>{STYLE}</style></head>
<body>
<nav><a href="/">Feedback</a><a href="/dashboard">Dashboard</a><a href="/sensors">Sensors</a>
<a href="/voice">Voice</a><a href="/playback">Playback</a></nav>
<div class="caption">{caption}</div>
{body}
</body></html>"#,
        title = esc(title),
        caption = esc(probe_caption),
        body = body,
    )
}

pub fn error_banner(msg: &str) -> String {
    format!(r#"<div class="banner error">{}</div>"#, esc(msg))
}

pub fn success_banner(msg: &str) -> String {
    format!(r#"<div class="banner success">{}</div>"#, esc(msg))
}

/// A colored status dot with text, like the survey's inline value chips.
pub fn chip(color: &str, text: &str) -> String {
    format!(
        r#"<div class="chip"><span class="dot" style="background:{}"></span><span>{}</span></div>"#,
        color,
        esc(text)
    )
}

/// A KPI card.
pub fn metric_card(title: &str, value: &str, sub: &str) -> String {
    format!(
        r#"<div class="card"><div class="t">{}</div><div class="v">{}</div><div class="s">{}</div></div>"#,
        esc(title),
        esc(value),
        esc(sub)
    )
}

/// A horizontal gradient strip with evenly spaced tick labels, used under
/// the sensation and glare sliders.
pub fn gradient_legend(colors: &[&str], labels: &[&str]) -> String {
    let stops = colors.join(", ");
    let ticks: String = labels
        .iter()
        .map(|l| format!("<span>{}</span>", esc(l)))
        .collect();
    format!(
        r#"<div><div class="legend-bar" style="background:linear-gradient(90deg, {stops})"></div>
<div class="legend-ticks">{ticks}</div></div>"#
    )
}

/// A label/count histogram rendered as proportional bars.
pub fn bar_rows(rows: &[(String, usize)]) -> String {
    let max = rows.iter().map(|(_, n)| *n).max().unwrap_or(1).max(1);
    rows.iter()
        .map(|(label, n)| {
            let pct = (*n as f64 / max as f64 * 100.0).round();
            format!(
                r#"<div class="bar-row"><span class="lbl">{}</span><span class="bar" style="width:{}%"></span><span>{}</span></div>"#,
                esc(label),
                pct,
                n
            )
        })
        .collect()
}

/// A timestamp/value series rendered as proportional bars (value-scaled).
pub fn series_rows(rows: &[(String, f64)]) -> String {
    let max = rows.iter().map(|(_, v)| *v).fold(f64::MIN, f64::max);
    let max = if max > 0.0 { max } else { 1.0 };
    rows.iter()
        .map(|(label, v)| {
            let pct = (v / max * 100.0).clamp(0.0, 100.0).round();
            format!(
                r#"<div class="bar-row"><span class="lbl">{}</span><span class="bar" style="width:{}%"></span><span>{:.1}</span></div>"#,
                esc(label),
                pct,
                v
            )
        })
        .collect()
}

/// A plain table from pre-escaped cell text.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let head: String = headers
        .iter()
        .map(|h| format!("<th>{}</th>", esc(h)))
        .collect();
    let body: String = rows
        .iter()
        .map(|cells| {
            let tds: String = cells
                .iter()
                .map(|c| format!("<td>{}</td>", esc(c)))
                .collect();
            format!("<tr>{}</tr>", tds)
        })
        .collect();
    format!("<table><thead><tr>{}</tr></thead><tbody>{}</tbody></table>", head, body)
}

//=========================================================================================
// Color maps (same palette as the survey legends)
//=========================================================================================

pub fn thermal_color(v: i16) -> &'static str {
    match v {
        i16::MIN..=-3 => "#1e3a8a",
        -2 => "#2563eb",
        -1 => "#60a5fa",
        0 => "#e5e7eb",
        1 => "#fdba74",
        2 => "#f97316",
        _ => "#dc2626",
    }
}

pub fn glare_color(v: i16) -> &'static str {
    match v {
        i16::MIN..=1 => "#000000",
        2 => "#4b5563",
        3 => "#9ca3af",
        4 => "#f59e0b",
        _ => "#fde047",
    }
}

pub fn kss_color(v: i16) -> &'static str {
    match v {
        i16::MIN..=1 => "#16a34a",
        2 => "#22c55e",
        3 => "#4ade80",
        4 => "#a3e635",
        5 => "#eab308",
        6 => "#f59e0b",
        7 => "#fb923c",
        8 => "#f97316",
        _ => "#ef4444",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esc_neutralizes_markup() {
        assert_eq!(esc(r#"<b a="1">"#), "&lt;b a=&quot;1&quot;&gt;");
    }

    #[test]
    fn bar_rows_scale_to_the_largest_count() {
        let html = bar_rows(&[("A".to_string(), 2), ("B".to_string(), 4)]);
        assert!(html.contains("width:50%"));
        assert!(html.contains("width:100%"));
    }
}
