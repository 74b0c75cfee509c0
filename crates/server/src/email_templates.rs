//! Email template rendering with HTML (Askama) and SCSS styling
use askama::Template;
use once_cell::sync::Lazy;

/// Compiled and inlined CSS from SCSS
static COMPILED_CSS: Lazy<String> = Lazy::new(|| {
    let scss = include_str!("../styles/email.scss");
    grass::from_string(scss.to_string(), &grass::Options::default())
        .expect("Failed to compile SCSS")
});

/// Inline CSS into HTML
#[tracing::instrument(skip(html))]
fn inline_css(html: &str) -> String {
    let options = css_inline::InlineOptions {
        load_remote_stylesheets: false,
        ..css_inline::InlineOptions::default()
    };

    let inliner = css_inline::CSSInliner::new(options);

    // Inject the compiled CSS into the HTML
    let html_with_style = html.replace(
        "</head>",
        &format!("<style>{}</style></head>", COMPILED_CSS.as_str()),
    );

    match inliner.inline(&html_with_style) {
        Ok(inlined) => inlined,
        Err(e) => {
            tracing::error!(
                name = "email.inline_css.failed",
                target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                error = ?e,
                message = "Failed to inline CSS"
            );
            html.to_string()
        }
    }
}

/// Template for emergency alert notifications sent to matched donors.
#[derive(Template)]
#[template(path = "emergency_alert_email.html")]
pub struct EmergencyAlertEmailTemplate {
    pub blood_group: String,
    pub pincode: String,
    pub contact_phone: String,
    pub respond_url: String,
}

impl EmergencyAlertEmailTemplate {
    #[tracing::instrument(skip(self))]
    pub fn render_html(&self) -> Result<String, askama::Error> {
        let html = self.render()?;
        Ok(inline_css(&html))
    }

    #[tracing::instrument(skip(self))]
    pub fn render_text(&self) -> String {
        format!(
            r#"Hello,

URGENT: a patient near postal code {} needs {} blood.

If you can donate, please call {} as soon as possible, or confirm your
availability by opening this link:
{}

Every response is logged so coordinators know who to expect.

Thank you for being a donor,
The Blood-Connect Team"#,
            self.pincode, self.blood_group, self.contact_phone, self.respond_url
        )
    }
}
