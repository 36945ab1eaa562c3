//! Entity schemas for the site's admin forms.

use serde_json::json;

use super::schema::{
    CollectionTemplate, EntitySchema, FieldKind, FieldSchema, RuleCheck, RuleSchema, Separator,
    TabSchema,
};

pub fn builtin_schemas() -> Vec<EntitySchema> {
    vec![blogs(), events(), projects(), resources()]
}

pub fn blogs() -> EntitySchema {
    EntitySchema {
        name: "blogs".into(),
        title: "Blog".into(),
        id_keys: id_keys(),
        tabs: vec![
            tab("basic", "Basic Info"),
            tab("content", "Content"),
            tab("media", "Media"),
            tab("advanced", "Advanced"),
        ],
        fields: vec![
            field("title", "Title", "basic", FieldKind::Text),
            field("author", "Author", "basic", FieldKind::Text),
            field("date", "Publish Date", "basic", FieldKind::Date),
            field(
                "category",
                "Category",
                "basic",
                choice(&["Technology", "Community", "Events", "Tutorials", "News"]),
            ),
            field("excerpt", "Excerpt", "content", FieldKind::LongText),
            field("content", "Content", "content", FieldKind::LongText),
            field("tags", "Tags", "content", list(Separator::Comma)),
            upload_field("image", "Cover Image", "media", FieldKind::Text),
            upload_field("gallery", "Gallery", "media", list(Separator::Newline)),
            field("readTime", "Read Time (min)", "advanced", integer(0)),
            field("likes", "Likes", "advanced", integer(0)),
            field("comments", "Comments", "advanced", integer(0)),
            field("rating", "Rating", "advanced", number(5.0)),
            field("featured", "Featured", "advanced", FieldKind::Boolean),
            field("keywords", "SEO Keywords", "advanced", list(Separator::Comma)),
        ],
        rules: vec![
            required("basic", "title", "Title is required"),
            required("basic", "author", "Author is required"),
            required("content", "content", "Content is required"),
        ],
        search_fields: vec!["title".into(), "author".into(), "tags".into()],
        filter_field: Some("category".into()),
    }
}

pub fn events() -> EntitySchema {
    EntitySchema {
        name: "events".into(),
        title: "Event".into(),
        id_keys: id_keys(),
        tabs: vec![
            tab("basic", "Basic Info"),
            tab("details", "Details"),
            tab("people", "Speakers & Teams"),
            tab("media", "Media"),
        ],
        fields: vec![
            field("title", "Title", "basic", FieldKind::Text),
            field("date", "Date", "basic", FieldKind::Date),
            field("time", "Time", "basic", FieldKind::Text),
            field("location", "Location", "basic", FieldKind::Text),
            field(
                "type",
                "Type",
                "basic",
                choice(&["Workshop", "Hackathon", "Meetup", "Conference", "Webinar"]),
            ),
            FieldSchema {
                default: Some(json!("upcoming")),
                ..field(
                    "status",
                    "Status",
                    "basic",
                    choice(&["upcoming", "ongoing", "completed"]),
                )
            },
            field("description", "Description", "details", FieldKind::LongText),
            field("agenda", "Agenda", "details", list(Separator::Newline)),
            field(
                "prerequisites",
                "Prerequisites",
                "details",
                list(Separator::Newline),
            ),
            field("tags", "Tags", "details", list(Separator::Comma)),
            field("maxAttendees", "Max Attendees", "details", integer(0)),
            field("registrationLink", "Registration Link", "details", FieldKind::Text),
            field(
                "speakers",
                "Speakers",
                "people",
                collection(&["name", "role", "description", "image"], "name"),
            ),
            field(
                "teams",
                "Teams",
                "people",
                collection(&["name", "lead", "idea", "theme", "description"], "name"),
            ),
            upload_field("image", "Banner Image", "media", FieldKind::Text),
            upload_field("gallery", "Gallery", "media", list(Separator::Newline)),
        ],
        rules: vec![
            required("basic", "title", "Title is required"),
            required("basic", "location", "Location is required"),
            required("details", "description", "Description is required"),
        ],
        search_fields: vec![
            "title".into(),
            "location".into(),
            "description".into(),
            "tags".into(),
        ],
        filter_field: Some("status".into()),
    }
}

pub fn projects() -> EntitySchema {
    EntitySchema {
        name: "projects".into(),
        title: "Project".into(),
        id_keys: id_keys(),
        tabs: vec![
            tab("basic", "Basic Info"),
            tab("details", "Details"),
            tab("team", "Team"),
            tab("links", "Links"),
        ],
        fields: vec![
            field("title", "Title", "basic", FieldKind::Text),
            field(
                "status",
                "Status",
                "basic",
                choice(&["planning", "in-progress", "completed"]),
            ),
            field("startDate", "Start Date", "basic", FieldKind::Date),
            field("progress", "Progress (%)", "basic", integer(0)),
            field("description", "Description", "details", FieldKind::LongText),
            field("technologies", "Technologies", "details", list(Separator::Comma)),
            field("features", "Features", "details", list(Separator::Newline)),
            field(
                "team",
                "Team Members",
                "team",
                collection(&["name", "role", "image"], "name"),
            ),
            field("github", "GitHub URL", "links", FieldKind::Text),
            field("demo", "Demo URL", "links", FieldKind::Text),
            upload_field("image", "Image", "links", FieldKind::Text),
        ],
        rules: vec![
            required("basic", "title", "Title is required"),
            required("details", "description", "Description is required"),
            RuleSchema {
                tab: "basic".into(),
                field: "progress".into(),
                check: RuleCheck::Range {
                    min: 0.0,
                    max: 100.0,
                },
                message: "Progress must be between 0 and 100".into(),
            },
        ],
        search_fields: vec!["title".into(), "description".into(), "technologies".into()],
        filter_field: Some("status".into()),
    }
}

pub fn resources() -> EntitySchema {
    EntitySchema {
        name: "resources".into(),
        title: "Resource".into(),
        id_keys: id_keys(),
        tabs: vec![
            tab("basic", "Basic Info"),
            tab("content", "Content"),
            tab("meta", "Metadata"),
        ],
        fields: vec![
            field("title", "Title", "basic", FieldKind::Text),
            field("url", "URL", "basic", FieldKind::Text),
            field(
                "category",
                "Category",
                "basic",
                choice(&["Documentation", "Tutorial", "Video", "Tool", "Article", "Course"]),
            ),
            field(
                "difficulty",
                "Difficulty",
                "basic",
                choice(&["Beginner", "Intermediate", "Advanced"]),
            ),
            field("description", "Description", "content", FieldKind::LongText),
            field(
                "prerequisites",
                "Prerequisites",
                "content",
                list(Separator::Newline),
            ),
            field("tags", "Tags", "meta", list(Separator::Comma)),
            field("author", "Author", "meta", FieldKind::Text),
            field("rating", "Rating", "meta", number(5.0)),
            field("free", "Free", "meta", FieldKind::Boolean),
            upload_field("image", "Thumbnail", "meta", FieldKind::Text),
        ],
        rules: vec![
            required("basic", "title", "Title is required"),
            required("basic", "url", "URL is required"),
            RuleSchema {
                tab: "basic".into(),
                field: "url".into(),
                check: RuleCheck::Pattern {
                    pattern: "^https?://".into(),
                },
                message: "URL must start with http:// or https://".into(),
            },
            required("content", "description", "Description is required"),
        ],
        search_fields: vec!["title".into(), "description".into(), "tags".into()],
        filter_field: Some("category".into()),
    }
}

fn id_keys() -> Vec<String> {
    vec!["_id".into(), "id".into()]
}

fn tab(id: &str, title: &str) -> TabSchema {
    TabSchema {
        id: id.into(),
        title: title.into(),
    }
}

fn field(name: &str, title: &str, tab: &str, kind: FieldKind) -> FieldSchema {
    FieldSchema {
        name: name.into(),
        title: title.into(),
        tab: tab.into(),
        kind,
        default: None,
        upload: false,
    }
}

fn upload_field(name: &str, title: &str, tab: &str, kind: FieldKind) -> FieldSchema {
    FieldSchema {
        upload: true,
        ..field(name, title, tab, kind)
    }
}

fn choice(options: &[&str]) -> FieldKind {
    FieldKind::Choice {
        options: options.iter().map(|option| option.to_string()).collect(),
    }
}

fn list(separator: Separator) -> FieldKind {
    FieldKind::List { separator }
}

fn integer(fallback: i64) -> FieldKind {
    FieldKind::Integer { fallback }
}

fn number(fallback: f64) -> FieldKind {
    FieldKind::Number { fallback }
}

fn collection(fields: &[&str], name_field: &str) -> FieldKind {
    FieldKind::Collection(CollectionTemplate {
        fields: fields.iter().map(|field| field.to_string()).collect(),
        name_field: name_field.into(),
    })
}

fn required(tab: &str, field: &str, message: &str) -> RuleSchema {
    RuleSchema {
        tab: tab.into(),
        field: field.into(),
        check: RuleCheck::Required,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_consistent() {
        for schema in builtin_schemas() {
            assert_eq!(schema.check(), Ok(()), "{} should pass checks", schema.name);
        }
    }

    #[test]
    fn speakers_and_teams_use_distinct_templates() {
        let schema = events();
        let templates: Vec<_> = ["speakers", "teams"]
            .iter()
            .map(|name| match &schema.field(name).unwrap().kind {
                FieldKind::Collection(template) => template.fields.clone(),
                other => panic!("unexpected kind {other:?}"),
            })
            .collect();
        assert_ne!(templates[0], templates[1]);
        assert!(templates[1].contains(&"lead".to_string()));
    }
}
