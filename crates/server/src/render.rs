//! HTML rendering of a `PageView`.
//!
//! Widgets appear in a fixed order: title, description, sample table, the
//! two inputs, the prediction line (PredictionReady only), popularity chart.
//! All user-controlled text goes through `escape`.

use data_loader::PopularityCount;
use pipeline::page::{
    DESCRIPTION, POPULAR_HEADING, PRODUCT_PROMPT, SAMPLE_HEADING, TITLE, USER_PROMPT,
};
use pipeline::{PageInputs, PageView, SampleTable};

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem;color:#262730}\
table{border-collapse:collapse;font-size:.85rem;display:block;overflow-x:auto}\
th,td{border:1px solid #e6e9ef;padding:.25rem .5rem;text-align:left;white-space:nowrap;max-width:20rem;overflow:hidden;text-overflow:ellipsis}\
label{display:block;margin-top:.75rem}input{width:100%;padding:.4rem}\
button{margin-top:.75rem}.prediction{margin-top:1rem;font-weight:bold}.bar{fill:#1f77b4}";

// Chart geometry, in SVG user units
const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 380.0;
const MARGIN_LEFT: f64 = 48.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 16.0;
const MARGIN_BOTTOM: f64 = 120.0;

/// Escape text for use in HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Render the full page
pub fn page(view: &PageView) -> String {
    let mut body = String::new();
    body.push_str(&format!("<h1>{}</h1>\n<p>{}</p>\n", escape(TITLE), escape(DESCRIPTION)));

    body.push_str(&format!("<h2>{}</h2>\n", escape(SAMPLE_HEADING)));
    body.push_str(&sample_table(&view.sample));

    body.push_str(&input_form(&view.inputs));

    if let Some(line) = view.state.prediction_line() {
        body.push_str(&format!("<p class=\"prediction\">{}</p>\n", escape(&line)));
    }

    body.push_str(&format!("<h2>{}</h2>\n", escape(POPULAR_HEADING)));
    body.push_str(&bar_chart(&view.popular));

    document(TITLE, &body)
}

/// Render an error page; used when the pipeline fails
pub fn error_page(message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p class=\"error\">{}</p>\n",
        escape(TITLE),
        escape(message)
    );
    document("Error", &body)
}

fn document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape(title),
        STYLE,
        body
    )
}

fn sample_table(sample: &SampleTable) -> String {
    let mut html = String::from("<table>\n<thead><tr><th></th>");
    for column in &sample.columns {
        html.push_str(&format!("<th>{}</th>", escape(column)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in &sample.rows {
        html.push_str(&format!("<tr><th>{}</th>", row.row));
        for cell in &row.cells {
            html.push_str(&format!("<td title=\"{0}\">{0}</td>", escape(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

fn input_form(inputs: &PageInputs) -> String {
    format!(
        "<form method=\"get\" action=\"/\">\n\
         <label for=\"user_id\">{}</label>\n\
         <input id=\"user_id\" name=\"user_id\" type=\"text\" value=\"{}\">\n\
         <label for=\"product_id\">{}</label>\n\
         <input id=\"product_id\" name=\"product_id\" type=\"text\" value=\"{}\">\n\
         <button type=\"submit\">Predict</button>\n\
         </form>\n",
        escape(USER_PROMPT),
        escape(&inputs.user_id),
        escape(PRODUCT_PROMPT),
        escape(&inputs.product_id)
    )
}

/// Vertical bar chart: products on the x axis, rating counts on the y axis
fn bar_chart(popular: &[PopularityCount]) -> String {
    let plot_width = CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + plot_height;
    let max_count = popular.iter().map(|p| p.count).max().unwrap_or(0);

    let mut svg = format!(
        "<svg class=\"chart\" role=\"img\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\">\n",
        w = CHART_WIDTH,
        h = CHART_HEIGHT
    );

    // Axes
    svg.push_str(&format!(
        "<line x1=\"{x}\" y1=\"{top}\" x2=\"{x}\" y2=\"{base}\" stroke=\"#999\"/>\n\
         <line x1=\"{x}\" y1=\"{base}\" x2=\"{right}\" y2=\"{base}\" stroke=\"#999\"/>\n",
        x = MARGIN_LEFT,
        top = MARGIN_TOP,
        base = baseline,
        right = CHART_WIDTH - MARGIN_RIGHT
    ));

    // Y ticks at 0 and the maximum
    for value in [0, max_count] {
        let y = baseline - scaled(value, max_count, plot_height);
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"end\">{}</text>\n",
            MARGIN_LEFT - 6.0,
            y + 4.0,
            value
        ));
    }

    if !popular.is_empty() {
        let slot = plot_width / popular.len() as f64;
        let bar_width = slot * 0.7;

        for (idx, product) in popular.iter().enumerate() {
            let height = scaled(product.count, max_count, plot_height);
            let x = MARGIN_LEFT + slot * idx as f64 + (slot - bar_width) / 2.0;
            let label_x = x + bar_width / 2.0;
            let label_y = baseline + 12.0;
            let id = escape(&product.product_id);

            svg.push_str(&format!(
                "<rect class=\"bar\" x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\">\
                 <title>{}: {}</title></rect>\n",
                x,
                baseline - height,
                bar_width,
                height,
                id,
                product.count
            ));
            svg.push_str(&format!(
                "<text x=\"{lx:.1}\" y=\"{ly:.1}\" font-size=\"11\" text-anchor=\"end\" \
                 transform=\"rotate(-45 {lx:.1} {ly:.1})\">{id}</text>\n",
                lx = label_x,
                ly = label_y,
                id = id
            ));
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn scaled(value: usize, max: usize, span: f64) -> f64 {
    if max == 0 {
        0.0
    } else {
        value as f64 / max as f64 * span
    }
}
