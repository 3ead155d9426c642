use tera::{Context, Tera};
use tracing::info;

use crate::web::routes::JOIN_WAITLIST_PATH;

const HOME_TEMPLATE: &str = "html/home.html";

/// Owns the parsed templates. They are compiled into the binary, so rendering doesn't depend
/// on the working directory.
#[derive(Debug)]
pub struct TemplateManager {
    tera: Tera,
}

impl TemplateManager {
    pub fn init() -> Result<Self, tera::Error> {
        info!(
            "{:<20} - Initializing the Template manager",
            "templ manager"
        );
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![(
            HOME_TEMPLATE,
            include_str!("../templates/html/home.html"),
        )])?;

        Ok(Self { tera })
    }

    /// The landing page with the signup form.
    pub fn render_home(&self) -> Result<String, tera::Error> {
        let mut ctx = Context::new();
        ctx.insert("join_path", &format!("/api{JOIN_WAITLIST_PATH}"));

        self.tera.render(HOME_TEMPLATE, &ctx)
    }

    pub fn tera(&self) -> &Tera {
        &self.tera
    }
}
