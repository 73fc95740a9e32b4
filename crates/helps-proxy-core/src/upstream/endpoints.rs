//! Static dispatch table: tool name → REST endpoint + query mapping

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// A known tool's REST endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub tool: &'static str,
    pub path: &'static str,
    /// `(argument key, query key)` pairs, in query-string order
    pub params: &'static [(&'static str, &'static str)],
}

pub static ENDPOINTS: &[Endpoint] = &[
    Endpoint {
        tool: "fetch_scripture",
        path: "/api/fetch-scripture",
        params: &[
            ("reference", "reference"),
            ("language", "language"),
            ("organization", "organization"),
            ("resource", "resource"),
            ("format", "format"),
        ],
    },
    Endpoint {
        tool: "fetch_translation_notes",
        path: "/api/fetch-translation-notes",
        params: &[
            ("reference", "reference"),
            ("language", "language"),
            ("organization", "organization"),
            ("includeIntro", "includeIntro"),
            ("includeContext", "includeContext"),
        ],
    },
    Endpoint {
        tool: "fetch_translation_questions",
        path: "/api/fetch-translation-questions",
        params: &[("reference", "reference"), ("language", "language"), ("organization", "organization")],
    },
    Endpoint {
        tool: "fetch_translation_word_links",
        path: "/api/fetch-translation-word-links",
        params: &[("reference", "reference"), ("language", "language"), ("organization", "organization")],
    },
    Endpoint {
        tool: "fetch_translation_word",
        path: "/api/fetch-translation-word",
        params: &[
            ("term", "term"),
            ("reference", "reference"),
            ("path", "path"),
            ("language", "language"),
            ("organization", "organization"),
        ],
    },
    Endpoint {
        tool: "fetch_translation_academy",
        path: "/api/fetch-translation-academy",
        params: &[
            ("moduleId", "moduleId"),
            ("path", "path"),
            ("rcLink", "rcLink"),
            ("language", "language"),
            ("organization", "organization"),
        ],
    },
    Endpoint {
        tool: "get_context",
        path: "/api/get-context",
        params: &[("reference", "reference"), ("language", "language"), ("organization", "organization")],
    },
    Endpoint {
        tool: "get_languages",
        path: "/api/get-languages",
        params: &[("organization", "organization"), ("resource", "resource")],
    },
    Endpoint {
        tool: "browse_translation_words",
        path: "/api/browse-translation-words",
        params: &[("category", "category"), ("language", "language"), ("organization", "organization")],
    },
    Endpoint {
        tool: "list_available_resources",
        path: "/api/list-available-resources",
        params: &[("query", "query"), ("language", "language"), ("organization", "organization")],
    },
];

static BY_NAME: Lazy<HashMap<&'static str, &'static Endpoint>> =
    Lazy::new(|| ENDPOINTS.iter().map(|e| (e.tool, e)).collect());

/// Endpoint for a tool, if it is in the static table
pub fn lookup(tool: &str) -> Option<&'static Endpoint> {
    BY_NAME.get(tool).copied()
}
