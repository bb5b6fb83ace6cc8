//! floorviz command line shell.
//!
//! Lists result archives and renders one viewport of an annotation payload to
//! PNG (and optionally SVG), the way the interactive viewer would show it.

#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::path::{Path, PathBuf};

    use clap::{Args, Parser, Subcommand};
    use floorviz::config::{LogLevel, ViewerSize};
    use floorviz::constants::VECTOR_BACKGROUND;
    use floorviz::geometry::Point;
    use floorviz::render::ViewMode;
    use floorviz::{Engine, EntryKind, Error, PayloadKind, Result, ResultArchive, ViewerConfig};
    use floorviz_raster::{compose_viewport, load_rgba, save_png, RasterOptions};
    use image::{Rgba, RgbaImage};

    #[derive(Parser)]
    #[command(name = "floorviz", about = "Floorplan annotation viewer")]
    #[command(version)]
    struct Cli {
        /// Viewer configuration file (JSON)
        #[arg(short, long, global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// List archive entries and their payload kinds
        List {
            /// Result archive (ZIP)
            archive: PathBuf,
        },
        /// Render the viewport for one payload
        Render(RenderArgs),
    }

    #[derive(Args)]
    struct RenderArgs {
        /// Result archive (ZIP)
        archive: PathBuf,

        /// Payload entry to visualize
        #[arg(short, long)]
        payload: String,

        /// Base image; defaults to the first image in the archive
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Output PNG
        #[arg(short, long)]
        out: PathBuf,

        /// Also write the overlay as SVG
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Viewer size, e.g. 1280x800
        #[arg(long, value_parser = parse_size)]
        viewer: Option<(u32, u32)>,

        /// Zoom level (clamped to the fit zoom and 5.0)
        #[arg(long)]
        zoom: Option<f32>,

        /// Zoom anchor in viewer pixels, e.g. 640,400; defaults to the center
        #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
        anchor: Option<(f32, f32)>,

        /// Scroll by DX,DY zoomed pixels after zooming
        #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
        pan: Option<(f32, f32)>,

        /// Hide a class (repeatable)
        #[arg(long = "hide-class")]
        hide_class: Vec<String>,

        /// Hide a dimension area by index (repeatable)
        #[arg(long = "hide-dimension", allow_hyphen_values = true)]
        hide_dimension: Vec<i64>,

        #[arg(long)]
        no_labels: bool,

        #[arg(long)]
        no_keypoints: bool,

        /// Hide dimension OCR that could not be placed
        #[arg(long)]
        hide_unresolved: bool,

        /// Draw the CAD-style vector view instead of the annotated image
        #[arg(long)]
        vector: bool,
    }

    fn parse_size(s: &str) -> std::result::Result<(u32, u32), String> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WxH, got '{}'", s))?;
        let w = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
        let h = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
        if w == 0 || h == 0 {
            return Err("viewer size must be non-zero".to_string());
        }
        Ok((w, h))
    }

    fn parse_pair(s: &str) -> std::result::Result<(f32, f32), String> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y, got '{}'", s))?;
        let x = x.trim().parse::<f32>().map_err(|e| e.to_string())?;
        let y = y.trim().parse::<f32>().map_err(|e| e.to_string())?;
        Ok((x, y))
    }

    fn init_logger(level: LogLevel) {
        env_logger::Builder::new()
            .filter_level(level.to_level_filter())
            .parse_default_env()
            .init();
    }

    pub fn run() -> bool {
        let cli = Cli::parse();

        let config = cli.config.as_deref().map(ViewerConfig::load).transpose();
        let level = match &config {
            Ok(Some(c)) => c.log_level,
            _ => LogLevel::default(),
        };
        init_logger(level);

        let result = config.and_then(|config| {
            let config = config.unwrap_or_default();
            match &cli.command {
                Commands::List { archive } => list(archive),
                Commands::Render(args) => render(args, config),
            }
        });

        match result {
            Ok(()) => true,
            Err(e) => {
                log::error!("{}", e);
                false
            }
        }
    }

    fn list(path: &Path) -> Result<()> {
        let archive = ResultArchive::open(path)?;
        for name in archive.entry_names() {
            let kind = EntryKind::of(name).to_string();
            println!("{:<20} {}", kind, name);
        }
        Ok(())
    }

    fn load_base_image(args: &RenderArgs, archive: &ResultArchive) -> Result<Option<RgbaImage>> {
        if let Some(path) = &args.image {
            log::info!("Loading base image {:?}", path);
            return Ok(Some(load_rgba(path)?));
        }
        match archive.find_image() {
            Some(name) => {
                log::info!("Loading base image '{}' from archive", name);
                let bytes = archive.read_bytes(name)?;
                Ok(Some(image::load_from_memory(bytes)?.to_rgba8()))
            }
            None => Ok(None),
        }
    }

    fn render(args: &RenderArgs, mut config: ViewerConfig) -> Result<()> {
        if let Some((width, height)) = args.viewer {
            config.viewer = ViewerSize { width, height };
        }
        config.display.show_labels &= !args.no_labels;
        config.display.show_keypoints &= !args.no_keypoints;
        config.display.hide_unresolved |= args.hide_unresolved;

        let archive = ResultArchive::open(&args.archive)?;
        let base = load_base_image(args, &archive)?;
        let mut engine = Engine::new(config);
        engine.begin_image_load();

        // The crop payload carries the transform every other payload needs
        if let Some(crop) = archive.find_crop_payload() {
            if crop != args.payload {
                engine.visualize(crop, PayloadKind::Crop, &archive.read_text(crop)?)?;
            }
        }

        let kind = PayloadKind::from_entry_name(&args.payload);
        let report = engine.visualize(&args.payload, kind, &archive.read_text(&args.payload)?)?;
        for class in &report.classes {
            log::info!("  {:<24} {:>5}", class.name, class.count);
        }

        if let Some(connection) = archive.connection_for(&args.payload) {
            engine.attach_junctions(&archive.read_text(connection)?)?;
        }

        let content = match (&base, engine.resolver().context()) {
            (Some(image), _) => (image.width() as f32, image.height() as f32),
            (None, Some(context)) => (context.original_size.width, context.original_size.height),
            (None, None) => return Err(Error::missing_size("original_size")),
        };
        engine.image_loaded(content.0, content.1);

        for class in &args.hide_class {
            if !engine.set_class_visible(class, false) {
                log::warn!("Class '{}' is not in '{}'", class, args.payload);
            }
        }
        for &index in &args.hide_dimension {
            if !engine.set_dimension_area_visible(index, false) {
                log::warn!("Dimension area {} is not in '{}'", index, args.payload);
            }
        }

        if let Some(zoom) = args.zoom {
            let viewer = engine.viewport().viewer_size();
            let (x, y) = args.anchor.unwrap_or((viewer.width / 2.0, viewer.height / 2.0));
            engine.set_zoom(zoom, Point::new(x, y));
        }
        if let Some((dx, dy)) = args.pan {
            engine.pan(dx, dy);
        }

        if args.vector {
            engine.set_view_mode(ViewMode::Vector);
        }

        let (svg, stats) = engine.render_svg();
        log::info!(
            "Drew {} objects, {} labels, {} junctions",
            stats.objects,
            stats.labels,
            stats.junctions
        );
        if let Some(path) = &args.svg {
            std::fs::write(path, &svg)?;
            log::info!("Wrote overlay SVG to {:?}", path);
        }

        let view = engine
            .view_window()
            .ok_or_else(|| Error::missing_size("original_size"))?;
        let (base, options) = if args.vector {
            let [r, g, b] = VECTOR_BACKGROUND.to_rgb8();
            let options = RasterOptions {
                background: Rgba([r, g, b, 255]),
                ..RasterOptions::default()
            };
            (None, options)
        } else {
            (base.as_ref(), RasterOptions::default())
        };
        let output = compose_viewport(base, &svg, view, &options)?;
        save_png(&output, &args.out)?;
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_size() {
            assert_eq!(parse_size("1280x800"), Ok((1280, 800)));
            assert_eq!(parse_size("640X480"), Ok((640, 480)));
            assert!(parse_size("1280").is_err());
            assert!(parse_size("0x800").is_err());
        }

        #[test]
        fn test_parse_pair() {
            assert_eq!(parse_pair("10,-5.5"), Ok((10.0, -5.5)));
            assert!(parse_pair("10;5").is_err());
        }

        #[test]
        fn test_cli_definition() {
            use clap::CommandFactory;
            Cli::command().debug_assert();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    if cli::run() {
        std::process::ExitCode::SUCCESS
    } else {
        std::process::ExitCode::FAILURE
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
