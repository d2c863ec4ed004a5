use go_diagram::{Diagram, ReplyToken};
use wasm_bindgen::prelude::*;

/// Parse a diagram source and return its render state as JSON.
/// On error: `{ "error": "message" }`
#[wasm_bindgen]
pub fn render_source(source: &str) -> String {
    match Diagram::parse_with_replies(source, Box::new(random_reply)) {
        Ok(diagram) => state_json(&diagram),
        Err(e) => error_json(&e.to_string()),
    }
}

#[wasm_bindgen]
pub struct WasmDiagram {
    inner: Diagram,
}

#[wasm_bindgen]
impl WasmDiagram {
    /// Throws the diagram error message if the source is invalid.
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str) -> Result<WasmDiagram, JsValue> {
        Diagram::parse_with_replies(source, Box::new(random_reply))
            .map(|inner| WasmDiagram { inner })
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn kind(&self) -> String {
        self.inner.kind().to_string()
    }

    // -- Renderer hooks --

    pub fn on_board_click(&mut self, col: u8, row: u8) -> bool {
        self.inner.on_board_click((col, row))
    }

    pub fn on_undo(&mut self) -> bool {
        self.inner.on_undo()
    }

    pub fn on_redo(&mut self) -> bool {
        self.inner.on_redo()
    }

    pub fn on_pass(&mut self) -> bool {
        self.inner.on_pass()
    }

    pub fn on_reset(&mut self) -> bool {
        self.inner.on_reset()
    }

    pub fn on_first(&mut self) -> bool {
        self.inner.on_first()
    }

    pub fn on_previous(&mut self) -> bool {
        self.inner.on_previous()
    }

    pub fn on_next(&mut self) -> bool {
        self.inner.on_next()
    }

    pub fn on_last(&mut self) -> bool {
        self.inner.on_last()
    }

    // -- Deferred replies --

    /// JSON `{ "token": { "generation": n }, "delay_ms": n }`, or empty string.
    /// The host calls `fire_reply(generation)` after `delay_ms`.
    pub fn pending_reply_json(&self) -> String {
        match self.inner.pending_reply() {
            Some(pending) => serde_json::to_string(&pending).unwrap_or_default(),
            None => String::new(),
        }
    }

    pub fn fire_reply(&mut self, generation: u64) -> bool {
        self.inner.fire_reply(ReplyToken { generation })
    }

    // -- JSON serialization (WASM boundary) --

    pub fn render_state_json(&self) -> String {
        state_json(&self.inner)
    }

    pub fn board(&self) -> js_sys::Int8Array {
        js_sys::Int8Array::from(self.inner.render_state().board.stones())
    }
}

fn random_reply(count: usize) -> usize {
    (js_sys::Math::random() * count as f64) as usize
}

fn state_json(diagram: &Diagram) -> String {
    serde_json::to_string(&diagram.render_state()).unwrap_or_else(|e| error_json(&e.to_string()))
}

fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}
