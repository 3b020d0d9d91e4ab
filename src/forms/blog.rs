//! Blog post form

use super::{rules, FieldErrors, Pipeline, Rule};
use crate::{
    models::post::{PostForm, PostInput},
    services::tags::split_tags,
};

const TITLE_RULES: &[Rule] = &[rules::no_sql_keywords, rules::no_script];
const TAG_RULES: &[Rule] = &[rules::no_sql_keywords, rules::no_script];

impl PostForm {
    pub fn clean(self) -> Result<PostInput, FieldErrors> {
        let mut p = Pipeline::start(&self);

        let title = p.required("title", &self.title, TITLE_RULES, rules::TITLE_MAX);
        let content = p.text("content", &self.content, &[rules::no_script]);
        if !p.has_errors_for("content") {
            p.check("content", rules::required(&content));
        }

        // Content rules see each raw token; length and emptiness are judged
        // on the normalized names that will be stored.
        let tags = self.tags.as_deref().map(|raw| {
            for token in raw.split(',') {
                p.rules("tags", token, TAG_RULES);
            }
            let names = split_tags(raw);
            for name in &names {
                p.max_chars("tags", name, rules::TAG_MAX);
            }
            names
        });

        p.finish(PostInput { title, content, tags })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(tags: Option<&str>) -> PostForm {
        PostForm {
            title: "Hello".to_string(),
            content: "First post".to_string(),
            tags: tags.map(str::to_string),
        }
    }

    #[test]
    fn test_tags_are_split_and_deduplicated() {
        let input = form(Some(" rust, web ,rust,, ")).clean().unwrap();
        assert_eq!(input.tags, Some(vec!["rust".to_string(), "web".to_string()]));
    }

    #[test]
    fn test_absent_tags_keep_existing() {
        assert_eq!(form(None).clean().unwrap().tags, None);
        assert_eq!(form(Some("")).clean().unwrap().tags, Some(vec![]));
    }

    #[test]
    fn test_bad_tag_rejected() {
        let long = "x".repeat(51);
        let errors = form(Some(&format!("ok,{}", long))).clean().unwrap_err();
        assert!(errors.contains("tags"));
        let errors = form(Some("union-all")).clean().unwrap_err();
        assert!(errors.contains("tags"));
    }

    #[test]
    fn test_tags_empty_after_stripping_are_dropped() {
        let input = form(Some("rust, <>")).clean().unwrap();
        assert_eq!(input.tags, Some(vec!["rust".to_string()]));

        let input = form(Some("a<, a, <a>")).clean().unwrap();
        assert_eq!(input.tags, Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_tag_length_is_checked_after_escaping() {
        // 30 raw characters, 150 once escaped
        let errors = form(Some(&"&".repeat(30))).clean().unwrap_err();
        assert!(errors.contains("tags"));
        assert!(form(Some(&"x".repeat(50))).clean().is_ok());
    }

    #[test]
    fn test_title_empty_after_stripping_is_required() {
        let mut f = form(None);
        f.title = "<>".to_string();
        assert!(f.clean().unwrap_err().contains("title"));
    }

    #[test]
    fn test_script_in_content_rejected() {
        let mut f = form(None);
        f.content = "<iframe src=evil>".to_string();
        assert!(f.clean().unwrap_err().contains("content"));
    }
}
