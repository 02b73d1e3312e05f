use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::pipeline::PageView;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>YouTube Transcript Summarizer</title>
    <link href="https://cdn.jsdelivr.net/npm/tailwindcss@2.2.19/dist/tailwind.min.css" rel="stylesheet">
</head>
<body class="bg-gray-100 min-h-screen">
    <div class="container mx-auto px-4 py-8">
        <div class="max-w-3xl mx-auto">
            <h1 class="text-4xl font-bold text-center mb-8 text-gray-800">
                YouTube Transcript Summarizer
            </h1>

            <form method="POST" class="mb-8">
                <div class="flex gap-4">
                    <input
                        type="text"
                        name="url"
                        placeholder="Enter YouTube URL"
                        class="flex-1 p-3 border rounded-lg focus:outline-none focus:ring-2 focus:ring-blue-500"
                        required
                    >
                    <button
                        type="submit"
                        class="bg-blue-500 text-white px-6 py-3 rounded-lg hover:bg-blue-600 transition-colors"
                    >
                        Summarize
                    </button>
                </div>
            </form>
"#;

const PAGE_TAIL: &str = r#"        </div>
    </div>
</body>
</html>
"#;

/// Render the single page for a request
pub fn render_page(view: &PageView) -> String {
    let mut html = String::from(PAGE_HEAD);

    if let Some(error) = &view.error {
        html.push_str(&format!(
            r#"
            <div class="bg-red-100 border-l-4 border-red-500 text-red-700 p-4 mb-8" role="alert">
                <p>{}</p>
            </div>
"#,
            encode_text(error)
        ));
    }

    if let Some(video_id) = &view.video_id {
        html.push_str(&format!(
            r#"
            <div class="mb-8">
                <div class="aspect-w-16 aspect-h-9">
                    <iframe
                        class="w-full h-96 rounded-lg shadow-lg"
                        src="{}"
                        frameborder="0"
                        allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture"
                        allowfullscreen
                    ></iframe>
                </div>
            </div>
"#,
            encode_double_quoted_attribute(&video_id.embed_url())
        ));
    }

    if let Some(summary) = view.summary.as_deref().filter(|s| !s.is_empty()) {
        html.push_str(&format!(
            r#"
            <div class="bg-white rounded-lg shadow-lg p-6 space-y-6">
                <div>
                    <h2 class="text-2xl font-semibold mb-4 text-gray-800">Summary</h2>
                    <div class="prose max-w-none text-gray-700">
                        {}
                    </div>
                </div>
"#,
            encode_text(summary)
        ));

        if !view.key_points.is_empty() {
            html.push_str(
                r#"
                <div>
                    <h2 class="text-2xl font-semibold mb-4 text-gray-800">Key Points</h2>
                    <ul class="list-disc pl-6 space-y-2 text-gray-700">
"#,
            );
            for point in &view.key_points {
                html.push_str(&format!("                        <li>{}</li>\n", encode_text(point)));
            }
            html.push_str(
                r#"                    </ul>
                </div>
"#,
            );
        }

        html.push_str("            </div>\n");
    }

    html.push_str(PAGE_TAIL);
    html
}
