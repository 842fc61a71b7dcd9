use tera::Tera;

/// Build the template engine with all page templates compiled in.
///
/// Templates are embedded at build time so the binary renders the same pages
/// regardless of working directory.
pub fn build() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../../templates/base.html")),
        ("homepage.html", include_str!("../../templates/homepage.html")),
        ("notes.html", include_str!("../../templates/notes.html")),
        ("contact.html", include_str!("../../templates/contact.html")),
        ("about.html", include_str!("../../templates/about.html")),
        ("todolist.html", include_str!("../../templates/todolist.html")),
        ("404.html", include_str!("../../templates/404.html")),
    ])?;
    Ok(tera)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::flash::Flash;

    #[test]
    fn all_templates_compile() {
        build().unwrap();
    }

    #[test]
    fn base_renders_flash_levels_as_alert_classes() {
        let tera = build().unwrap();
        let mut context = tera::Context::new();
        context.insert("page", "Homepage");
        context.insert(
            "messages",
            &[Flash::success("saved"), Flash::error("broken")],
        );
        let html = tera.render("homepage.html", &context).unwrap();
        assert!(html.contains("alert-success"));
        // The error level maps to Bootstrap's danger class.
        assert!(html.contains("alert-danger"));
    }

    #[test]
    fn todolist_escapes_task_descriptions() {
        let tera = build().unwrap();
        let mut context = tera::Context::new();
        context.insert("page", "Things To Do");
        context.insert("messages", &[] as &[Flash]);
        context.insert(
            "tasks",
            &serde_json::json!([{
                "id": 1,
                "description": "<script>alert(1)</script>",
                "is_completed": false,
                "created_at": "2026-01-01T00:00:00Z",
                "updated_at": "2026-01-01T00:00:00Z",
            }]),
        );
        let html = tera.render("todolist.html", &context).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
