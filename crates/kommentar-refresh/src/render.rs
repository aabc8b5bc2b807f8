use std::fmt::Write as _;

use kommentar_core::ActionHash;

/// What the comment view currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Rendered {
    #[default]
    Loading,
    Error(String),
    Empty,
    /// One detail view per comment, in display order.
    Comments(Vec<ActionHash>),
}

impl Rendered {
    pub fn comment_hashes(&self) -> &[ActionHash] {
        match self {
            Rendered::Comments(hashes) => hashes,
            _ => &[],
        }
    }

    /// HTML fragment for the view.
    pub fn to_html(&self) -> String {
        match self {
            Rendered::Loading => {
                r#"<div class="loading" aria-busy="true"></div>"#.to_string()
            }
            Rendered::Error(message) => format!(
                r#"<span class="error">Error fetching comments: {}.</span>"#,
                escape(message)
            ),
            Rendered::Empty => "<span>No comments found for this post.</span>".to_string(),
            Rendered::Comments(hashes) => {
                let mut html = String::from(r#"<div class="comments">"#);
                for hash in hashes {
                    let _ = write!(
                        html,
                        r#"<comment-detail comment-hash="{}"></comment-detail>"#,
                        hash
                    );
                }
                html.push_str("</div>");
                html
            }
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
