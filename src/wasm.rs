//! Browser bindings
//!
//! A JS-owned tray handle. The page drives `frame` from requestAnimationFrame;
//! results and luck come back as JSON. Meshes, atlases and the per-frame
//! instance buffer come back as raw bytes in the layouts from `vertex_layout`.

use wasm_bindgen::prelude::*;

use crate::dice::{DieDescriptor, DieType};
use crate::notation::DiceCounts;
use crate::renderer::{
    DieInstanceRaw, DieMesh, DieVertex, HULL_OVERLAY_SCALE, LineVertex, die_instances,
    hull_overlay, hull_wireframe, layout_words, vertex::colors, wall_vertices,
};
use crate::settings::TraySettings;
use crate::sim::DiceTray;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Polydice starting...");
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Vertex layout words (see `renderer::layout_words`) for `die`, `instance` or `line`
#[wasm_bindgen]
pub fn vertex_layout(kind: &str) -> Result<Vec<u32>, JsValue> {
    let layout = match kind {
        "die" => DieVertex::desc(),
        "instance" => DieInstanceRaw::desc(),
        "line" => LineVertex::desc(),
        other => return Err(JsValue::from_str(&format!("unknown vertex layout: {other}"))),
    };
    Ok(layout_words(&layout))
}

/// Background, wall and wireframe colours as 12 floats
#[wasm_bindgen]
pub fn palette() -> Vec<f32> {
    colors::palette().concat()
}

#[wasm_bindgen]
pub struct WasmDiceTray {
    tray: DiceTray,
}

#[wasm_bindgen]
impl WasmDiceTray {
    /// Tray using settings from LocalStorage
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<WasmDiceTray, JsValue> {
        let tray = DiceTray::new(TraySettings::load(), seed).map_err(to_js)?;
        Ok(Self { tray })
    }

    fn descriptor(&self, faces: u32) -> Result<&DieDescriptor, JsValue> {
        DieType::from_faces(faces)
            .map(|kind| self.tray.library().get(kind))
            .ok_or_else(|| JsValue::from_str(&format!("no d{faces}")))
    }

    /// Roll a notation string such as `2d6+1d20+3`; returns the roll seed
    pub fn roll(&mut self, notation: &str) -> Result<u64, JsValue> {
        let counts = DiceCounts::from_notation(notation).map_err(to_js)?;
        Ok(self.tray.roll(&counts).map_err(to_js)?.seed)
    }

    pub fn roll_with_seed(&mut self, notation: &str, seed: u64) -> Result<u64, JsValue> {
        let counts = DiceCounts::from_notation(notation).map_err(to_js)?;
        Ok(self.tray.roll_with_seed(&counts, seed).map_err(to_js)?.seed)
    }

    /// Advance one frame (`dt` in seconds); returns the report as JSON
    pub fn frame(&mut self, dt: f32) -> Result<String, JsValue> {
        let report = self.tray.frame(dt);
        serde_json::to_string(&report).map_err(to_js)
    }

    /// Current request in canonical notation
    pub fn notation(&self) -> String {
        self.tray.request().to_notation()
    }

    pub fn all_settled(&self) -> bool {
        self.tray.all_settled()
    }

    pub fn die_count(&self) -> usize {
        self.tray.dice().len()
    }

    /// Face count of each die in spawn order
    pub fn die_faces(&self) -> Vec<u32> {
        self.tray.dice().iter().map(|d| d.kind.face_count()).collect()
    }

    /// Per die: position xyz then rotation xyzw
    pub fn poses(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.tray.dice().len() * 7);
        for die in self.tray.dice() {
            out.extend_from_slice(&die.pose.position.to_array());
            out.extend_from_slice(&die.pose.rotation.to_array());
        }
        out
    }

    /// Visible wall boxes: center xyz then half extents xyz
    pub fn walls(&self) -> Vec<f32> {
        let mut out = Vec::new();
        for wall in self.tray.walls().iter().filter(|w| w.visible) {
            out.extend_from_slice(&wall.center.to_array());
            out.extend_from_slice(&wall.half_extents.to_array());
        }
        out
    }

    /// Triangle list for one die type, `DieVertex` layout
    pub fn die_mesh(&self, faces: u32) -> Result<Vec<u8>, JsValue> {
        let mesh = DieMesh::build(self.descriptor(faces)?);
        Ok(mesh.vertex_bytes().to_vec())
    }

    /// Label atlas for one die type as RGBA8 rows
    pub fn label_atlas_rgba(&self, faces: u32) -> Result<Vec<u8>, JsValue> {
        Ok(self.descriptor(faces)?.kind.label_atlas().into_raw())
    }

    /// Atlas width and height in pixels
    pub fn label_atlas_size(&self, faces: u32) -> Result<Vec<u32>, JsValue> {
        let atlas = self.descriptor(faces)?.kind.label_atlas();
        Ok(vec![atlas.width(), atlas.height()])
    }

    /// Model-space hull edges for one die type (line list, xyz per vertex)
    pub fn hull_wireframe(&self, faces: u32) -> Result<Vec<f32>, JsValue> {
        let lines = hull_wireframe(&self.descriptor(faces)?.collision, HULL_OVERLAY_SCALE);
        Ok(bytemuck::cast_slice(&lines).to_vec())
    }

    /// Instance buffer for the current frame, `DieInstanceRaw` layout
    pub fn instances(&self) -> Vec<u8> {
        bytemuck::cast_slice(&die_instances(self.tray.dice())).to_vec()
    }

    /// World-space wireframes of dice with hull display on (empty when off)
    pub fn hull_overlay(&self) -> Vec<f32> {
        let lines = hull_overlay(self.tray.dice(), self.tray.library());
        bytemuck::cast_slice(&lines).to_vec()
    }

    /// Hull display flag per die in spawn order
    pub fn show_hulls(&self) -> Vec<u8> {
        self.tray.dice().iter().map(|d| u8::from(d.show_hull)).collect()
    }

    /// Triangle list for the visible walls, `DieVertex` layout
    pub fn wall_mesh(&self) -> Vec<u8> {
        bytemuck::cast_slice(&wall_vertices(self.tray.walls())).to_vec()
    }

    pub fn set_debug_hulls(&mut self, show: bool) {
        self.tray.set_debug_hulls(show);
        self.tray.settings.save();
    }
}
