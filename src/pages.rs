//! HTML pages. Deliberately plain: one shared layout and a few forms.

use crate::models::{Category, Item, Outfit};

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Wardrobe</title>
    <style>
        body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }}
        .items {{ display: flex; flex-wrap: wrap; gap: 1rem; }}
        .item {{ border: 1px solid #ddd; border-radius: 6px; padding: .5rem; text-align: center; }}
        .item img {{ width: 10rem; height: 10rem; object-fit: cover; display: block; }}
        form.inline {{ display: inline; }}
    </style>
</head>
<body>
{body}
</body>
</html>"#,
        title = html_escape(title),
        body = body,
    )
}

pub fn login_page() -> String {
    layout(
        "Log in",
        r#"<h1>Log in</h1>
<form method="POST" action="/login">
    <p><label>Username <input type="text" name="username" required autofocus></label></p>
    <p><label>Password <input type="password" name="password" required></label></p>
    <p><button type="submit">Log in</button></p>
</form>
<p>No account yet? <a href="/register">Register</a></p>"#,
    )
}

pub fn register_page() -> String {
    layout(
        "Register",
        r#"<h1>Register</h1>
<form method="POST" action="/register">
    <p><label>Username <input type="text" name="username" required autofocus></label></p>
    <p><label>Email <input type="email" name="email" required></label></p>
    <p><label>Password <input type="password" name="password" required minlength="6"></label></p>
    <p><button type="submit">Create account</button></p>
</form>
<p>Already registered? <a href="/">Log in</a></p>"#,
    )
}

pub fn welcome_page(username: &str, items: &[Item]) -> String {
    let options: String = Category::ALL
        .iter()
        .map(|c| format!(r#"<option value="{c}">{c}</option>"#))
        .collect();

    let cards = if items.is_empty() {
        "<p>Your wardrobe is empty. Upload your first item above.</p>".to_string()
    } else {
        let cards: String = items
            .iter()
            .map(|item| {
                format!(
                    r#"<div class="item">
    <img src="{src}" alt="{category}">
    <div>{category}</div>
    <form class="inline" method="POST" action="/delete-item/{id}"><button type="submit">Delete</button></form>
</div>"#,
                    src = html_escape(&item.image_url()),
                    category = html_escape(&item.category),
                    id = html_escape(&item.id),
                )
            })
            .collect();
        format!(r#"<div class="items">{cards}</div>"#)
    };

    let body = format!(
        r#"<h1>Welcome, {username}</h1>
<p><a href="/random-combination">Random outfit</a> · <a href="/logout">Log out</a></p>
<h2>Add an item</h2>
<form method="POST" action="/add-item" enctype="multipart/form-data">
    <input type="file" name="image" accept="image/*">
    <select name="category">{options}</select>
    <button type="submit">Upload</button>
</form>
<h2>Your items ({count})</h2>
{cards}"#,
        username = html_escape(username),
        options = options,
        count = items.len(),
        cards = cards,
    );

    layout("Wardrobe", &body)
}

pub fn outfit_page(outfit: &Outfit) -> String {
    let pieces: String = [&outfit.top, &outfit.bottom, &outfit.shoes]
        .iter()
        .map(|item| {
            format!(
                r#"<div class="item"><img src="{src}" alt="{category}"><div>{category}</div></div>"#,
                src = html_escape(&item.image_url()),
                category = html_escape(&item.category),
            )
        })
        .collect();

    let body = format!(
        r#"<h1>Today's outfit</h1>
<div class="items">{pieces}</div>
<p><a href="/random-combination">Shuffle again</a> · <a href="/welcome">Back to wardrobe</a></p>"#
    );

    layout("Outfit", &body)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
