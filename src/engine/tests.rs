//! Session-level scenarios: payload sequences, image loading and redraws.

use serde_json::json;

use super::*;
use crate::config::{ColorConfig, ColorScheme};
use crate::constants::VECTOR_BACKGROUND;
use crate::render::{DrawCommand, DrawList, ViewMode};
use image::{Rgba, RgbaImage};
use crate::viewport::ViewportState;
use crate::Error;

const EPSILON: f32 = 0.001;

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn engine() -> Engine {
    Engine::new(ViewerConfig {
        colors: ColorConfig {
            scheme: ColorScheme::Random,
            seed: Some(7),
        },
        ..ViewerConfig::default()
    })
}

fn floor1_crop() -> String {
    json!({"objects": [
        {
            "class_name": "background",
            "original_size": {"width": 1000, "height": 800},
            "crop_size": {"width": 500, "height": 400},
            "original_polygon": [[100, 100], [600, 100], [600, 500], [100, 500]]
        },
        {
            "class_name": "dimension_area",
            "idx": 3,
            "bbox_width": 50,
            "bbox_height": 20,
            "original_polygon": [[200, 300], [300, 300], [300, 340], [200, 340]]
        },
        {
            "class_name": "room",
            "original_polygon": [[150, 150], [250, 150], [250, 250], [150, 250]]
        }
    ]})
    .to_string()
}

fn floor1_symbol_ocr() -> String {
    json!({"objects": [{
        "symbol_polygon": [[50, 50], [70, 50], [70, 80], [50, 80]],
        "size": "600",
        "detail": "D"
    }]})
    .to_string()
}

fn floor1_dim_ocr() -> String {
    json!({"objects": [
        {"polygon": [[10, 5], [20, 5], [20, 10], [10, 10]], "text": "3600", "crop_idx": 3},
        {"polygon": [[1, 1], [2, 1], [2, 2]], "text": "900", "crop_idx": 9}
    ]})
    .to_string()
}

fn with_crop(engine: &mut Engine) {
    engine
        .visualize("floor1_crop.json", PayloadKind::Crop, &floor1_crop())
        .unwrap();
}

#[test]
fn test_crop_then_symbol_ocr_resolves_into_original_space() {
    let mut engine = engine();

    let report = engine
        .visualize("floor1_crop.json", PayloadKind::Crop, &floor1_crop())
        .unwrap();
    assert!(report.context_established);
    assert_eq!(report.objects, 3);

    let context = engine.resolver().context().unwrap();
    assert!(approx_eq(context.transform.scale_x, 1.0));
    assert!(approx_eq(context.transform.scale_y, 1.0));
    assert!(approx_eq(context.transform.offset_x, 100.0));
    assert!(approx_eq(context.transform.offset_y, 100.0));

    let report = engine
        .visualize("floor1_symbol_ocr.json", PayloadKind::SymbolOcr, &floor1_symbol_ocr())
        .unwrap();
    assert_eq!(report.objects, 1);

    let symbol = &engine.objects()[0];
    assert_eq!(symbol.points[0], Point::new(150.0, 150.0));
    assert_eq!(symbol.label, "600 D");
    assert_eq!(engine.current_payload(), Some(("floor1_symbol_ocr.json", PayloadKind::SymbolOcr)));
}

#[test]
fn test_crop_relative_without_crop_draws_nothing() {
    let mut engine = engine();

    let result = engine.visualize("floor1_symbol_ocr.json", PayloadKind::SymbolOcr, &floor1_symbol_ocr());
    assert!(matches!(result, Err(Error::MissingTransform { .. })));
    assert!(engine.objects().is_empty());

    let mut list = DrawList::new();
    let stats = engine.render(&mut list);
    assert_eq!(stats.objects, 0);
    assert_eq!(list.commands.len(), 1);
    assert!(matches!(list.commands[0], DrawCommand::Clear { .. }));
}

#[test]
fn test_missing_transform_replaces_previous_objects() {
    let mut engine = engine();
    engine
        .visualize("floor1_crop.json", PayloadKind::Crop, r#"{"objects": [{"class_name": "room", "original_polygon": [[0,0],[1,1]]}]}"#)
        .unwrap();
    assert_eq!(engine.objects().len(), 1);

    assert!(engine
        .visualize("floor1_space_ocr.json", PayloadKind::SpaceOcr, r#"{"objects": []}"#)
        .is_err());
    assert!(engine.objects().is_empty());
    assert!(engine.layers().is_empty());
}

#[test]
fn test_dimension_ocr_two_level_resolution() {
    let mut engine = engine();
    with_crop(&mut engine);

    let report = engine
        .visualize("floor1_dim_ocr.json", PayloadKind::DimensionOcr, &floor1_dim_ocr())
        .unwrap();
    assert_eq!(report.dimension_indices, vec![3, 9]);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].record, Some(1));

    let text = &engine.objects()[0];
    assert!(text.resolved);
    assert_eq!(text.points[0], Point::new(220.0, 310.0));
    assert_eq!(text.label, "3600 [3]");

    let unknown = &engine.objects()[1];
    assert!(!unknown.resolved);
    assert_eq!(unknown.points[0], Point::new(1.0, 1.0));
}

#[test]
fn test_dimension_area_toggle() {
    let mut engine = engine();
    with_crop(&mut engine);
    engine
        .visualize("floor1_dim_ocr.json", PayloadKind::DimensionOcr, &floor1_dim_ocr())
        .unwrap();

    let mut list = DrawList::new();
    assert_eq!(engine.render(&mut list).objects, 2);

    assert!(engine.set_dimension_area_visible(3, false));
    assert!(engine.needs_redraw());
    assert_eq!(engine.render(&mut list).objects, 1);

    assert!(!engine.set_dimension_area_visible(42, false));
}

#[test]
fn test_visibility_is_rebuilt_per_payload() {
    let mut engine = engine();
    with_crop(&mut engine);

    assert!(engine.set_class_visible("room", false));
    assert!(!engine.layers().is_class_visible("room"));
    assert!(!engine.set_class_visible("no_such_class", false));

    with_crop(&mut engine);
    assert!(engine.layers().is_class_visible("room"));

    let names: Vec<String> = engine.layers().class_summaries().into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["background", "dimension_area", "room"]);
}

#[test]
fn test_same_class_shares_color() {
    let mut engine = engine();
    engine
        .visualize(
            "plan_crop.json",
            PayloadKind::Crop,
            r#"{"objects": [
                {"class_name": "wall", "original_polygon": [[0,0],[5,0],[5,5]]},
                {"class_name": "wall", "original_polygon": [[9,9],[12,9],[12,12]]}
            ]}"#,
        )
        .unwrap();

    let objects = engine.objects();
    assert_eq!(objects[0].color, objects[1].color);
    assert_eq!(objects[0].color, engine.layers().layer("wall").unwrap().color);
}

#[test]
fn test_image_load_gates_viewport() {
    let mut engine = engine();
    engine.begin_image_load();

    assert_eq!(engine.image_state(), ImageState::Pending);
    assert_eq!(engine.content_size(), None);
    assert!(!engine.set_zoom(2.0, Point::new(0.0, 0.0)));
    assert!(!engine.pan(10.0, 10.0));

    assert!(engine.image_loaded(2000.0, 1000.0));
    assert_eq!(engine.viewport().state(), ViewportState::Loaded);
    // 1280x800 viewer
    assert!(approx_eq(engine.viewport().fit_zoom(), 0.64));
}

#[test]
fn test_completion_without_request_is_ignored() {
    let mut engine = engine();
    assert!(!engine.image_loaded(100.0, 100.0));
    assert_eq!(engine.image_state(), ImageState::NotRequested);
    assert!(!engine.viewport().is_loaded());
}

#[test]
fn test_crop_metadata_sets_content_size() {
    let mut engine = engine();
    engine.begin_image_load();
    with_crop(&mut engine);
    assert!(!engine.viewport().is_loaded());

    engine.image_loaded(333.0, 222.0);
    assert_eq!(engine.content_size(), Some(Size::new(1000.0, 800.0)));
    assert!(approx_eq(engine.viewport().fit_zoom(), 1.0));
}

#[test]
fn test_failed_image_returns_to_unloaded() {
    let mut engine = engine();
    engine.begin_image_load();
    engine.image_failed("truncated file");

    assert_eq!(engine.image_state(), ImageState::NotRequested);
    assert!(!engine.viewport().is_loaded());
}

#[test]
fn test_zoom_clamps_through_engine() {
    let mut engine = engine();
    engine.begin_image_load();
    engine.image_loaded(2000.0, 1000.0);

    assert!(engine.set_zoom(100.0, Point::new(640.0, 400.0)));
    assert!(approx_eq(engine.viewport().zoom(), 5.0));

    assert!(engine.set_zoom(0.01, Point::new(640.0, 400.0)));
    assert!(approx_eq(engine.viewport().zoom(), 0.64));
}

#[test]
fn test_pointer_drag_and_leave() {
    let mut engine = engine();
    engine.begin_image_load();
    engine.image_loaded(2000.0, 1000.0);
    engine.set_zoom(2.0, Point::new(0.0, 0.0));
    let (x0, y0) = engine.viewport().scroll();

    engine.handle_pointer(PointerInput::Press {
        at: Point::new(500.0, 500.0),
    });
    assert!(engine.handle_pointer(PointerInput::Move {
        at: Point::new(450.0, 480.0),
        button_held: true,
    }));
    let (x1, y1) = engine.viewport().scroll();
    assert!(approx_eq(x1, x0 + 50.0));
    assert!(approx_eq(y1, y0 + 20.0));

    engine.handle_pointer(PointerInput::Leave);
    assert!(!engine.viewport().is_dragging());
    assert!(!engine.handle_pointer(PointerInput::Move {
        at: Point::new(0.0, 0.0),
        button_held: true,
    }));
    assert_eq!(engine.viewport().scroll(), (x1, y1));
}

#[test]
fn test_double_click_toggles_zoom() {
    let mut engine = engine();
    engine.begin_image_load();
    engine.image_loaded(2000.0, 1000.0);

    assert!(engine.handle_pointer(PointerInput::DoubleClick {
        at: Point::new(100.0, 100.0),
    }));
    assert!(approx_eq(engine.viewport().zoom(), 2.0));

    assert!(engine.handle_pointer(PointerInput::DoubleClick {
        at: Point::new(100.0, 100.0),
    }));
    assert!(approx_eq(engine.viewport().zoom(), 0.64));
}

#[test]
fn test_redraw_flag_and_toggles() {
    let mut engine = engine();
    with_crop(&mut engine);
    assert!(engine.needs_redraw());

    let mut list = DrawList::new();
    let stats = engine.render(&mut list);
    assert!(!engine.needs_redraw());
    assert!(stats.labels > 0);

    assert!(!engine.toggle_labels());
    assert!(engine.needs_redraw());
    let stats = engine.render(&mut list);
    assert_eq!(stats.labels, 0);
    assert!(list.texts().is_empty());

    assert!(!engine.toggle_keypoints());
    engine.render(&mut list);
    assert_eq!(list.count(|c| matches!(c, DrawCommand::FillCircle { .. })), 0);
}

#[test]
fn test_junctions_attach_and_reset_with_payload() {
    let mut engine = engine();
    with_crop(&mut engine);

    let count = engine
        .attach_junctions(r#"{"connection": [{"center_point": [10, 20], "type": "T"}]}"#)
        .unwrap();
    assert_eq!(count, 1);

    let mut list = DrawList::new();
    assert_eq!(engine.render(&mut list).junctions, 1);

    with_crop(&mut engine);
    assert!(engine.junctions().is_empty());
}

#[test]
fn test_render_svg_uses_viewport_window() {
    let mut engine = engine();
    engine.begin_image_load();
    with_crop(&mut engine);
    engine.image_loaded(1000.0, 800.0);
    engine.set_zoom(2.0, Point::new(0.0, 0.0));

    let (svg, stats) = engine.render_svg();
    assert_eq!(stats.objects, 3);
    assert!(svg.contains(r#"viewBox="0 0 1280 800""#));
    assert!(svg.contains("<polygon"));
}

#[test]
fn test_malformed_payload_keeps_state() {
    let mut engine = engine();
    with_crop(&mut engine);

    assert!(matches!(
        engine.visualize("broken.json", PayloadKind::CropRelative, "{not json"),
        Err(Error::Json(_))
    ));
    assert_eq!(engine.objects().len(), 3);
}

#[test]
fn test_hide_unresolved_dimension_text() {
    let mut engine = engine();
    engine.begin_image_load();
    with_crop(&mut engine);
    engine.image_loaded(1000.0, 800.0);
    engine
        .visualize("floor1_dim_ocr.json", PayloadKind::DimensionOcr, &floor1_dim_ocr())
        .unwrap();

    let mut list = DrawList::new();
    let stats = engine.render(&mut list);
    assert_eq!(stats.objects, 2);
    assert_eq!(stats.hidden_unresolved, 0);

    engine.set_hide_unresolved(true);
    assert!(engine.display().hide_unresolved);
    assert!(engine.needs_redraw());
    let stats = engine.render(&mut list);
    assert_eq!(stats.objects, 1);
    assert_eq!(stats.hidden_unresolved, 1);
    assert!(!list.texts().contains(&"900"));

    // same value again: nothing to redraw
    engine.set_hide_unresolved(true);
    assert!(!engine.needs_redraw());

    engine.set_hide_unresolved(false);
    assert_eq!(engine.render(&mut list).objects, 2);
}

#[test]
fn test_smaller_base_image_is_stretched_over_crop_content() {
    let mut engine = Engine::new(ViewerConfig {
        viewer: crate::config::ViewerSize {
            width: 500,
            height: 400,
        },
        ..ViewerConfig::default()
    });
    engine.begin_image_load();
    with_crop(&mut engine);
    // decoded image is half the size the crop metadata declares
    engine.image_loaded(500.0, 400.0);

    assert_eq!(engine.content_size(), Some(Size::new(1000.0, 800.0)));
    assert!(approx_eq(engine.viewport().zoom(), 0.5));

    let view = engine.view_window().unwrap();
    assert_eq!((view.content_width, view.content_height), (1000.0, 800.0));
    assert_eq!((view.width, view.height), (500, 400));

    let base = RgbaImage::from_pixel(500, 400, Rgba([0, 0, 0, 255]));
    let out = floorviz_raster::render_base_view(&base, view);
    assert_eq!(out.get_pixel(400, 300).0, [0, 0, 0, 255]);
    assert_eq!(out.get_pixel(499, 399).0[3], 255);
}

#[test]
fn test_view_window_requires_loaded_viewport() {
    let mut engine = engine();
    assert!(engine.view_window().is_none());

    engine.begin_image_load();
    engine.image_loaded(2000.0, 1000.0);
    engine.set_zoom(1.0, Point::new(640.0, 400.0));

    let view = engine.view_window().unwrap();
    let (scroll_x, scroll_y) = engine.viewport().scroll();
    assert_eq!((view.scroll_x, view.scroll_y), (scroll_x, scroll_y));
    assert!(approx_eq(view.zoom, 1.0));
}

#[test]
fn test_vector_mode_draws_outlines_only() {
    let mut engine = engine();
    engine.begin_image_load();
    with_crop(&mut engine);
    engine.image_loaded(1000.0, 800.0);
    let mut list = DrawList::new();
    engine.render(&mut list);

    engine.set_view_mode(ViewMode::Vector);
    assert_eq!(engine.view_mode(), ViewMode::Vector);
    assert!(engine.needs_redraw());

    let stats = engine.render(&mut list);
    assert_eq!(stats.objects, 3);
    assert_eq!(stats.labels, 0);
    assert!(list.texts().is_empty());
    assert!(matches!(
        list.commands[1],
        DrawCommand::FillRect { color, .. } if color == VECTOR_BACKGROUND
    ));
    assert_eq!(list.count(|c| matches!(c, DrawCommand::FillPath { .. })), 0);

    engine.set_view_mode(ViewMode::Annotated);
    let stats = engine.render(&mut list);
    assert!(stats.labels > 0);
}
