//! Self-contained HTML page: the map SVG plus a hover tooltip.
//!
//! The embedded script drives the same HIDDEN/VISIBLE cycle as
//! `tooltip::TooltipController`: pointer over a county shows `#tooltip` at the
//! pointer plus the web offset, pointer out hides it.

use std::fmt::Write;

use crate::render::svg::xml_escape;
use crate::tooltip::TooltipConfig;

pub const PAGE_TITLE: &str = "United States Educational Attainment";
pub const PAGE_DESCRIPTION: &str =
    "Percentage of adults age 25 and older with a bachelor's degree or higher (2010-2014)";

/// Wrap an `<svg>` element (see `svg::map_svg_element`) into a page.
pub fn render_page(svg_element: &str, tooltip: TooltipConfig) -> String {
    let (dx, dy) = tooltip.offset;
    let fade_ms = tooltip.fade.as_millis();
    let mut out = String::new();

    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, r#"<html lang="en">"#);
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, r#"<meta charset="utf-8">"#);
    let _ = writeln!(out, "<title>{}</title>", xml_escape(PAGE_TITLE));
    let _ = writeln!(out, "<style>");
    let _ = writeln!(out, "body {{ font-family: sans-serif; text-align: center; }}");
    let _ = writeln!(out, ".county:hover {{ stroke: #333; stroke-width: 0.5; }}");
    let _ = writeln!(
        out,
        "#tooltip {{ position: absolute; opacity: 0; pointer-events: none; padding: 6px 10px; \
         background: rgba(255, 255, 204, 0.95); border: 1px solid #999; border-radius: 4px; \
         font-size: 13px; transition: opacity {fade_ms}ms; }}"
    );
    let _ = writeln!(out, "</style>");
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, r#"<h1 id="title">{}</h1>"#, xml_escape(PAGE_TITLE));
    let _ = writeln!(out, r#"<div id="description">{}</div>"#, xml_escape(PAGE_DESCRIPTION));
    out.push_str(svg_element);
    if !svg_element.ends_with('\n') {
        out.push('\n');
    }
    let _ = writeln!(out, r#"<div id="tooltip"></div>"#);
    let _ = writeln!(out, "<script>");
    let _ = writeln!(out, "(function () {{");
    let _ = writeln!(out, "  var tip = document.getElementById('tooltip');");
    let _ = writeln!(out, "  document.querySelectorAll('#layer-1 .county').forEach(function (path) {{");
    // Enter and every move reposition the tooltip next to the pointer.
    let _ = writeln!(out, "    var show = function (ev) {{");
    let _ = writeln!(out, "      tip.textContent = path.getAttribute('data-tooltip');");
    let _ = writeln!(
        out,
        "      tip.setAttribute('data-education', path.getAttribute('data-education'));"
    );
    let _ = writeln!(out, "      tip.style.left = (ev.pageX + ({dx})) + 'px';");
    let _ = writeln!(out, "      tip.style.top = (ev.pageY + ({dy})) + 'px';");
    let _ = writeln!(out, "      tip.style.opacity = 1;");
    let _ = writeln!(out, "    }};");
    let _ = writeln!(out, "    path.addEventListener('mouseover', show);");
    let _ = writeln!(out, "    path.addEventListener('mousemove', show);");
    let _ = writeln!(out, "    path.addEventListener('mouseout', function () {{");
    let _ = writeln!(out, "      tip.style.opacity = 0;");
    let _ = writeln!(out, "    }});");
    let _ = writeln!(out, "  }});");
    let _ = writeln!(out, "}})();");
    let _ = writeln!(out, "</script>");
    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");
    out
}
