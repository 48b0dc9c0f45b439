//! Gallery page rendering. The pack ships no template engine, so the markup
//! is assembled directly and returned as a `text/html` body.

use crate::config::CaptionConfig;
use crate::store::GalleryEntry;

const STYLE: &str = r#"
  body { margin: 0; font-family: Georgia, serif; background: #f3ede2; color: #3a2e20; }
  header { text-align: center; padding: 2rem 1rem 1rem; }
  header h1 { margin: 0; font-size: 2rem; }
  header p { margin: 0.3rem 0 0; color: #7a6a52; }
  main { max-width: 960px; margin: 0 auto; padding: 0 1rem 3rem; }
  form { text-align: center; margin: 1rem 0 2rem; }
  .button { display: inline-block; padding: 0.7rem 1.6rem; background: #3a2e20; color: #f3ede2;
            border-radius: 4px; cursor: pointer; }
  #status { min-height: 1.2rem; color: #7a6a52; }
  .gallery { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 1rem; }
  .card { margin: 0; background: #fff; padding: 0.4rem; box-shadow: 0 2px 6px rgba(0,0,0,0.2); }
  .card img { display: block; width: 100%; height: auto; }
  .empty { grid-column: 1 / -1; text-align: center; color: #7a6a52; }
"#;

const SCRIPT: &str = r#"
  const input = document.querySelector('input[name=photo]');
  const status = document.getElementById('status');
  input.addEventListener('change', async () => {
    if (!input.files.length) return;
    const form = new FormData();
    form.append('photo', input.files[0]);
    status.textContent = 'Enviando...';
    try {
      const resp = await fetch('/upload', { method: 'POST', body: form });
      if (resp.ok) { location.reload(); return; }
    } catch (_) {}
    status.textContent = 'Falha no envio. Tente novamente.';
  });
"#;

pub fn render_gallery(captions: &CaptionConfig, photos: &[GalleryEntry]) -> String {
    let mut cards = String::new();
    for photo in photos {
        cards.push_str(&format!(
            "      <figure class=\"card\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></figure>\n",
            escape(&photo.secure_url),
            escape(&photo.public_id),
        ));
    }
    if photos.is_empty() {
        cards.push_str("      <p class=\"empty\">Nenhuma foto ainda. Seja o primeiro!</p>\n");
    }

    let mut html = String::with_capacity(2048 + cards.len());
    html.push_str("<!doctype html>\n<html lang=\"pt-BR\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&captions.title)));
    html.push_str("<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str(&format!(
        "  <header>\n    <h1>{}</h1>\n    <p>{}</p>\n  </header>\n",
        escape(&captions.title),
        escape(&captions.names),
    ));
    html.push_str("  <main>\n");
    html.push_str(
        "    <form id=\"upload-form\">\n      <label class=\"button\">Enviar foto\n        \
         <input type=\"file\" name=\"photo\" accept=\"image/*\" hidden>\n      </label>\n      \
         <p id=\"status\" role=\"status\"></p>\n    </form>\n",
    );
    html.push_str("    <section class=\"gallery\">\n");
    html.push_str(&cards);
    html.push_str("    </section>\n  </main>\n");
    html.push_str("<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn captions() -> CaptionConfig {
        CaptionConfig {
            title: "Bodas de Ouro".to_string(),
            names: "Jonas e Cleide".to_string(),
        }
    }

    #[test]
    fn empty_gallery_renders_placeholder() {
        let html = render_gallery(&captions(), &[]);
        assert!(html.contains("Nenhuma foto ainda"));
        assert!(!html.contains("<figure"));
    }

    #[test]
    fn entries_become_image_cards() {
        let photos = vec![GalleryEntry {
            public_id: "festa_tios/bodas_1".to_string(),
            secure_url: "https://res.cloudinary.com/demo/x.jpg".to_string(),
            created_at: None,
        }];
        let html = render_gallery(&captions(), &photos);
        assert!(html.contains("src=\"https://res.cloudinary.com/demo/x.jpg\""));
        assert!(!html.contains("Nenhuma foto ainda"));
    }

    #[test]
    fn attribute_values_are_escaped() {
        assert_eq!(escape(r#"a"b<c>&'d"#), "a&quot;b&lt;c&gt;&amp;&#39;d");
    }
}
