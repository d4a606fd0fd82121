//! Report rendering with `minijinja`.
//!
//! The built-in `email.html` is compiled into the binary. When a template
//! directory is configured, `email.html` is loaded from there instead.
//! Templates named `*.html` or `*.xml` are HTML-escaped, so certificate
//! fields cannot inject markup into the email.

use std::path::Path;

use minijinja::{context, path_loader, AutoEscape, Environment};

use crate::config::EMAIL_TEMPLATE_NAME;
use crate::error_handling::TemplateError;
use crate::notification::ExpiringEntry;

/// The built-in report template.
pub const DEFAULT_EMAIL_TEMPLATE: &str = include_str!("../../templates/email.html");

/// Renders the expiry report.
#[derive(Debug)]
pub struct ReportRenderer {
    env: Environment<'static>,
}

impl ReportRenderer {
    /// Creates a renderer using `template_dir` if given, the built-in template otherwise.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` if the built-in template does not compile.
    pub fn new(template_dir: Option<&Path>) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|name| {
            if name.ends_with(".html") || name.ends_with(".xml") {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });

        match template_dir {
            Some(dir) => env.set_loader(path_loader(dir)),
            None => env.add_template(EMAIL_TEMPLATE_NAME, DEFAULT_EMAIL_TEMPLATE)?,
        }

        Ok(Self { env })
    }

    /// Renders the report; `expiring` is the only variable the template sees.
    pub fn render(&self, entries: &[ExpiringEntry]) -> Result<String, TemplateError> {
        let template = self.env.get_template(EMAIL_TEMPLATE_NAME)?;
        Ok(template.render(context! { expiring => entries })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::utc;
    use std::fs;

    fn entry(cert: &str, delta: i64) -> ExpiringEntry {
        ExpiringEntry {
            cert: cert.to_string(),
            delta,
            expires: utc(2031, 1, 15),
            domains: vec![cert.to_string(), format!("www.{cert}")],
        }
    }

    #[test]
    fn test_builtin_template_renders_every_column() {
        let renderer = ReportRenderer::new(None).unwrap();
        let body = renderer.render(&[entry("example.com", 10)]).unwrap();

        assert!(body.contains("<td>example.com</td>"));
        assert!(body.contains(">10</td>"));
        assert!(body.contains("2031-01-15 00:00:00 UTC"));
        assert!(body.contains("example.com, www.example.com"));
    }

    #[test]
    fn test_rows_follow_entry_order() {
        let renderer = ReportRenderer::new(None).unwrap();
        let body = renderer
            .render(&[entry("second.example.com", 2), entry("first.example.com", 1)])
            .unwrap();
        let second = body.find("second.example.com").unwrap();
        let first = body.find("first.example.com").unwrap();
        assert!(second < first);
    }

    #[test]
    fn test_certificate_fields_are_escaped() {
        let renderer = ReportRenderer::new(None).unwrap();
        let body = renderer
            .render(&[entry("<script>alert(1)</script>", 1)])
            .unwrap();
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_expired_rows_are_marked() {
        let renderer = ReportRenderer::new(None).unwrap();
        let body = renderer.render(&[entry("old.example.com", -3)]).unwrap();
        assert!(body.contains("days expired"));
        assert!(body.contains(">-3</td>"));
    }

    #[test]
    fn test_template_directory_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(EMAIL_TEMPLATE_NAME),
            "{% for e in expiring %}[{{ e.cert }}:{{ e.delta }}]{% endfor %}",
        )
        .unwrap();

        let renderer = ReportRenderer::new(Some(dir.path())).unwrap();
        let body = renderer.render(&[entry("a&b.example.com", 4)]).unwrap();
        assert_eq!(body, "[a&amp;b.example.com:4]");
    }

    #[test]
    fn test_missing_template_in_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let renderer = ReportRenderer::new(Some(dir.path())).unwrap();
        assert!(renderer.render(&[entry("example.com", 1)]).is_err());
    }
}
