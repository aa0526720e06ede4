//! HTML building blocks shared by the receipt renderers.

/// Escapes text for element content and attribute values.
pub(crate) fn esc(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `<div class="line"><span>label</span><span>value</span></div>`
///
/// Both sides are escaped.
pub(crate) fn line(label: &str, value: &str) -> String {
    format!(
        "<div class=\"line\"><span>{}</span><span>{}</span></div>",
        esc(label),
        esc(value)
    )
}

/// Same as [`line`], in bold.
pub(crate) fn strong_line(label: &str, value: &str) -> String {
    format!(
        "<div class=\"line total\"><strong>{}</strong><strong>{}</strong></div>",
        esc(label),
        esc(value)
    )
}

pub(crate) fn note(text: &str) -> String {
    format!("<div class=\"note\">{}</div>", esc(text))
}

/// Opens a `<div class="section">` with an optional heading. Close with `</div>`.
pub(crate) fn open_section(body: &mut String, heading: Option<&str>) {
    body.push_str("<div class=\"section\">");
    if let Some(heading) = heading {
        body.push_str(&format!("<h3>{}</h3>", esc(heading)));
    }
}

const RECEIPT_STYLE: &str = "\
body { font-family: ui-monospace, SFMono-Regular, Menlo, monospace; margin: 0; padding: 12px; background: #fff; color: #111; }
.receipt { max-width: 320px; margin: 0 auto; }
.line { display: flex; justify-content: space-between; gap: 8px; font-size: 12px; }
.line.total { font-size: 14px; margin-top: 4px; }
.section { margin-top: 8px; border-top: 1px dashed #111; padding-top: 6px; }
.section h3 { margin: 0 0 4px 0; font-size: 12px; text-transform: uppercase; }
.note { color: #555; font-size: 10px; padding-left: 8px; }
.center { text-align: center; }
.business { font-size: 16px; font-weight: bold; }
.banner { text-align: center; font-weight: bold; border: 2px solid #111; padding: 4px; margin-bottom: 8px; }
.title { text-align: center; font-weight: bold; font-size: 14px; margin-top: 6px; }
@media print { body { padding: 0; } }";

/// A complete standalone document around a receipt body.
pub(crate) fn html_shell(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1.0"/>
<title>{}</title>
<style>
{}
</style>
</head>
<body><div class="receipt">{}</div></body>
</html>"#,
        esc(title),
        RECEIPT_STYLE,
        body
    )
}

/// Email clients ignore most of `<style>`, so the shell inlines the layout.
pub(crate) fn email_shell(title: &str, banner: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8"/>
<meta name="viewport" content="width=device-width, initial-scale=1.0"/>
<title>{title}</title>
<style>
{style}
</style>
</head>
<body style="margin:0;padding:0;background:#f4f4f4;">
<table role="presentation" width="100%" cellpadding="0" cellspacing="0" style="background:#f4f4f4;">
<tr><td align="center" style="padding:24px 12px;">
<div class="email-container" style="max-width:600px;width:100%;background:#fff;border-radius:6px;overflow:hidden;">
<div class="email-header" style="background:#1f3d2b;color:#fff;padding:16px;text-align:center;font-family:Helvetica,Arial,sans-serif;font-size:18px;">{banner}</div>
<div style="padding:16px;"><div class="receipt">{body}</div></div>
</div>
</td></tr>
</table>
</body>
</html>"#,
        title = esc(title),
        style = RECEIPT_STYLE,
        banner = esc(banner),
        body = body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_esc() {
        assert_eq!(
            esc(r#"<b>Tom & "Jerry's"</b>"#),
            "&lt;b&gt;Tom &amp; &quot;Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_shell_is_complete_document() {
        let html = html_shell("Receipt <1>", "<p>hi</p>");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Receipt &lt;1&gt;</title>"));
        assert!(html.contains("<p>hi</p>"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
