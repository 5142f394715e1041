use crate::{
    foundation::config::LayoutConfig,
    foundation::core::Point,
    layout::geometry::{PageGeometry, TextElement, TextRole},
    layout::metrics::{FontSpec, body_font, title_font},
    render::plan::{DrawOp, PagePlan},
    text::engine::TextAlign,
};

/// Lower page geometry into draw ops: title, body chunks, date, images, then the QR badge.
///
/// Empty text elements emit nothing. Cover-fitted images that overflow their cell are wrapped
/// in a clip to the cell.
pub fn compile_page(geometry: &PageGeometry, config: &LayoutConfig) -> PagePlan {
    let mut ops = Vec::new();

    for element in geometry.text_elements() {
        push_text(&mut ops, element, config);
    }

    for slot in &geometry.images {
        let image = DrawOp::Image {
            source: slot.source.clone(),
            rect: slot.draw_rect(),
        };
        if slot.needs_clip() {
            ops.push(DrawOp::PushClip { rect: slot.cell });
            ops.push(image);
            ops.push(DrawOp::PopClip);
        } else {
            ops.push(image);
        }
    }

    if let Some(qr) = &geometry.qr {
        ops.push(DrawOp::Image {
            source: qr.source.clone(),
            rect: qr.draw_rect(),
        });
        push_text(&mut ops, &qr.label, config);
    }

    PagePlan {
        page: geometry.page,
        ops,
    }
}

fn push_text(ops: &mut Vec<DrawOp>, element: &TextElement, config: &LayoutConfig) {
    if element.text.trim().is_empty() {
        return;
    }
    let (font, color, align) = match element.role {
        TextRole::Title => (title_font(config), config.text_color, TextAlign::Left),
        TextRole::Body => (body_font(config), config.text_color, TextAlign::Justify),
        TextRole::Date => (body_font(config), config.date_color, TextAlign::Left),
        TextRole::QrLabel => (
            FontSpec::regular(config.qr_label_size),
            config.date_color,
            TextAlign::Left,
        ),
    };
    ops.push(DrawOp::Text {
        text: element.text.clone(),
        font,
        color,
        align,
        origin: Point::new(element.rect.x0, element.rect.y0),
        max_width: element.rect.width(),
    });
}

#[cfg(test)]
#[path = "../../tests/unit/render/page.rs"]
mod tests;
