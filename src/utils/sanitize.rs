// Sanitization utilities

/// Sanitize a rendered markup fragment
///
/// Readmes and docs bodies may carry raw HTML from arbitrary
/// repositories, so fragments are cleaned with ammonia. Every anchor is
/// forced into a new browsing context with a safe rel, and heading ids
/// are kept for in-page navigation.
pub fn clean_markup(html: &str) -> String {
    let mut builder = ammonia::Builder::default();
    builder
        .add_tag_attributes("h1", &["id"])
        .add_tag_attributes("h2", &["id"])
        .add_tag_attributes("h3", &["id"])
        .add_tag_attributes("h4", &["id"])
        .add_tag_attributes("h5", &["id"])
        .add_tag_attributes("h6", &["id"])
        .add_tag_attributes("code", &["class"])
        .set_tag_attribute_value("a", "target", "_blank")
        .link_rel(Some("noopener noreferrer"));

    builder.clean(html).to_string()
}
