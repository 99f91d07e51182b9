use serde::Serialize;
use tera::escape_html;

use crate::models::Event;

/// Offset of the tooltip box from the pointer, in pixels.
const POINTER_OFFSET: f64 = 10.0;

/// Floating event-details box shown while hovering a segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tooltip {
    pub visible: bool,
    pub left: f64,
    pub top: f64,
    pub html: String,
}

impl Tooltip {
    pub fn show(&mut self, event: &Event, page_x: f64, page_y: f64) {
        self.html = details_html(event);
        self.visible = true;
        self.move_to(page_x, page_y);
    }

    pub fn move_to(&mut self, page_x: f64, page_y: f64) {
        self.left = page_x + POINTER_OFFSET;
        self.top = page_y + POINTER_OFFSET;
    }

    /// Hides the box; the last content is kept, only opacity drops.
    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn opacity(&self) -> u8 {
        u8::from(self.visible)
    }

    pub fn style(&self) -> String {
        format!(
            "opacity:{};left:{}px;top:{}px",
            self.opacity(),
            self.left,
            self.top
        )
    }
}

pub fn details_html(event: &Event) -> String {
    format!(
        "<strong>{}</strong><br>\
         <span style=\"color:#555\">File:{}</span><br>\
         <span style=\"color:#555\">Bytes:{}</span><br>\
         <span style=\"color:#555\">Duration:{}</span><br>\
         <span style=\"color:#555\">Return:{}</span><br>\
         <small>{} - {}</small>",
        escape_html(&event.event_name),
        escape_html(&event.fname),
        event.countbytes,
        event.latency,
        event.ret,
        escape_html(&event.en_datetime),
        escape_html(&event.ex_datetime),
    )
}

/// Plain-text variant, used as the native hover title of a segment link.
pub fn details_text(event: &Event) -> String {
    format!(
        "{}\nFile:{}\nBytes:{}\nDuration:{}\nReturn:{}\n{} - {}",
        event.event_name,
        event.fname,
        event.countbytes,
        event.latency,
        event.ret,
        event.en_datetime,
        event.ex_datetime,
    )
}
