//! Server-rendered HTML pages
//!
//! Every user-supplied value passes through `html_escape` before it is
//! interpolated; nothing here trusts stored data.

use std::fmt::Write;

use axum::http::StatusCode;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use super::csrf::{CsrfToken, CSRF_FIELD};
use super::forms::{PostForm, TodoForm};
use crate::models::{BlogPost, FieldErrors, TodoItem};

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
table{border-collapse:collapse;width:100%}td,th{border-bottom:1px solid #ddd;padding:.4rem;text-align:left}\
label{display:block;margin-top:.8rem}input[type=text],textarea{width:100%}\
.error{color:#b00020}.muted{color:#666}nav a{margin-right:1rem}";

pub fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} - todoblog</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav><a href=\"/\">Home</a><a href=\"/todos\">To-dos</a><a href=\"/blog/posts\">Blog</a></nav>\n\
         <h1>{title}</h1>\n{body}\n</body>\n</html>\n",
        title = text(title),
    )
}

pub fn home() -> String {
    layout(
        "Welcome",
        "<p>Keep track of things to do and write about them.</p>\n\
         <ul><li><a href=\"/todos\">To-do list</a></li><li><a href=\"/blog/posts\">Blog posts</a></li></ul>",
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(
        title,
        &format!(
            "<p class=\"error\">{}</p>\n<p><a href=\"/\">Back to start</a></p>",
            text(message)
        ),
    )
}

// ---------------------------------------------------------------------------
// To-dos
// ---------------------------------------------------------------------------

pub fn todo_list(items: &[TodoItem]) -> String {
    let mut body = String::from("<p><a href=\"/todos/add\">Add a to-do</a></p>\n");
    if items.is_empty() {
        body.push_str("<p class=\"muted\">Nothing to do.</p>");
        return layout("To-dos", &body);
    }

    body.push_str(
        "<table>\n<tr><th>Task</th><th>Description</th><th>Done</th><th>Created</th><th></th></tr>\n",
    );
    for item in items {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/todos/edit/{id}\">Edit</a> <a href=\"/todos/delete/{id}\">Delete</a></td></tr>",
            text(&item.task),
            text(&item.description),
            if item.is_completed { "yes" } else { "no" },
            item.created_at.format("%Y-%m-%d %H:%M"),
            id = item.id,
        );
    }
    body.push_str("</table>");
    layout("To-dos", &body)
}

pub fn todo_form(
    title: &str,
    action: &str,
    form: &TodoForm,
    errors: &FieldErrors,
    csrf: &CsrfToken,
) -> String {
    let mut body = form_open(action, csrf);
    hidden_id(&mut body, form.id.as_deref());
    text_input(&mut body, "task", "Task", &form.task, errors);
    textarea(&mut body, "description", "Description", &form.description, 4, errors);
    checkbox(&mut body, "is_completed", "Completed", form.is_completed());
    body.push_str(
        "<p><button type=\"submit\">Save</button> <a href=\"/todos\">Cancel</a></p>\n</form>",
    );
    layout(title, &body)
}

pub fn todo_delete(item: &TodoItem, csrf: &CsrfToken) -> String {
    let mut body = format!(
        "<p>Delete <strong>{}</strong>?</p>\n<p class=\"muted\">{}</p>\n",
        text(&item.task),
        text(&item.description)
    );
    body.push_str(&form_open(&format!("/todos/delete/{}", item.id), csrf));
    hidden_id(&mut body, Some(&item.id.to_string()));
    body.push_str(
        "<p><button type=\"submit\">Delete</button> <a href=\"/todos\">Cancel</a></p>\n</form>",
    );
    layout("Delete to-do", &body)
}

// ---------------------------------------------------------------------------
// Blog
// ---------------------------------------------------------------------------

pub fn post_list(posts: &[BlogPost]) -> String {
    let mut body = String::from("<p><a href=\"/blog/posts/add\">Write a post</a></p>\n");
    if posts.is_empty() {
        body.push_str("<p class=\"muted\">No posts yet.</p>");
        return layout("Blog posts", &body);
    }

    for post in posts {
        let _ = write!(
            body,
            "<article>\n<h2>{}</h2>\n<p class=\"muted\">by {} on {}{}{}</p>\n",
            text(&post.title),
            text(&post.author),
            post.created_at.format("%Y-%m-%d"),
            post.updated_at
                .map(|t| format!(", edited {}", t.format("%Y-%m-%d")))
                .unwrap_or_default(),
            if post.is_published { "" } else { " (draft)" },
        );
        if let Some(summary) = &post.summary {
            let _ = writeln!(body, "<p>{}</p>", text(summary));
        }
        let _ = writeln!(
            body,
            "<p><a href=\"/blog/posts/edit/{id}\">Edit</a> <a href=\"/blog/posts/delete/{id}\">Delete</a></p>\n</article>",
            id = post.id,
        );
    }
    layout("Blog posts", &body)
}

pub fn post_form(
    title: &str,
    action: &str,
    form: &PostForm,
    errors: &FieldErrors,
    csrf: &CsrfToken,
) -> String {
    let mut body = form_open(action, csrf);
    hidden_id(&mut body, form.id.as_deref());
    text_input(&mut body, "title", "Title", &form.title, errors);
    text_input(&mut body, "author", "Author", &form.author, errors);
    textarea(&mut body, "summary", "Summary (optional)", &form.summary, 2, errors);
    textarea(&mut body, "content", "Content", &form.content, 12, errors);
    checkbox(&mut body, "is_published", "Published", form.is_published());
    body.push_str(
        "<p><button type=\"submit\">Save</button> <a href=\"/blog/posts\">Cancel</a></p>\n</form>",
    );
    layout(title, &body)
}

pub fn post_delete(post: &BlogPost, csrf: &CsrfToken) -> String {
    let mut body = format!(
        "<p>Delete <strong>{}</strong> by {}?</p>\n",
        text(&post.title),
        text(&post.author)
    );
    body.push_str(&form_open(&format!("/blog/posts/delete/{}", post.id), csrf));
    hidden_id(&mut body, Some(&post.id.to_string()));
    body.push_str(
        "<p><button type=\"submit\">Delete</button> <a href=\"/blog/posts\">Cancel</a></p>\n</form>",
    );
    layout("Delete post", &body)
}

// ---------------------------------------------------------------------------
// Form fragments
// ---------------------------------------------------------------------------

fn form_open(action: &str, csrf: &CsrfToken) -> String {
    format!(
        "<form method=\"post\" action=\"{}\">\n<input type=\"hidden\" name=\"{CSRF_FIELD}\" value=\"{}\">\n",
        attr(action),
        attr(csrf.as_str()),
    )
}

fn hidden_id(body: &mut String, id: Option<&str>) {
    if let Some(id) = id {
        let _ = writeln!(body, "<input type=\"hidden\" name=\"id\" value=\"{}\">", attr(id));
    }
}

fn field_error(body: &mut String, name: &str, errors: &FieldErrors) {
    if let Some(message) = errors.get(name) {
        let _ = writeln!(body, "<span class=\"error\">{}</span>", text(message));
    }
}

fn text_input(body: &mut String, name: &str, label: &str, value: &str, errors: &FieldErrors) {
    let _ = writeln!(
        body,
        "<label for=\"{name}\">{label}</label>\n<input type=\"text\" id=\"{name}\" name=\"{name}\" value=\"{}\">",
        attr(value),
    );
    field_error(body, name, errors);
}

fn textarea(
    body: &mut String,
    name: &str,
    label: &str,
    value: &str,
    rows: u32,
    errors: &FieldErrors,
) {
    let _ = writeln!(
        body,
        "<label for=\"{name}\">{label}</label>\n<textarea id=\"{name}\" name=\"{name}\" rows=\"{rows}\">{}</textarea>",
        text(value),
    );
    field_error(body, name, errors);
}

fn checkbox(body: &mut String, name: &str, label: &str, checked: bool) {
    let _ = writeln!(
        body,
        "<label><input type=\"checkbox\" name=\"{name}\" value=\"true\"{}> {label}</label>",
        if checked { " checked" } else { "" },
    );
}
