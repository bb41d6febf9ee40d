//! Replay a scripted drag through the region selector and capture the result

use std::env;

use snapcap::{
    CaptureTarget, CatalogStore, Capturer, LogicalPoint, ScreenshotService, SelectorEvent,
    SettingsStore,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Usage: capture_region [x1 y1 x2 y2] in overlay-logical coordinates
    let coords: Vec<f64> = env::args().skip(1).filter_map(|a| a.parse().ok()).collect();
    let (from, to) = match coords.as_slice() {
        [x1, y1, x2, y2] => (LogicalPoint::new(*x1, *y1), LogicalPoint::new(*x2, *y2)),
        _ => (LogicalPoint::new(100.0, 100.0), LogicalPoint::new(500.0, 400.0)),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async {
        let settings = SettingsStore::default_location().load();
        println!("Saving to {:?} as {}", settings.save_directory, settings.default_format);

        let service = ScreenshotService::new(Capturer::new()?, CatalogStore::default_location(), settings);

        let mut selector = service.begin_region_selection().await?;
        let bounds = selector.overlay().bounds();
        println!(
            "Virtual desktop: {}x{} at ({}, {}) across {} monitor(s)",
            bounds.width,
            bounds.height,
            bounds.left,
            bounds.top,
            selector.overlay().monitors().len()
        );

        selector.on_presented();
        let outcome = selector.run([
            SelectorEvent::PointerDown(from),
            SelectorEvent::PointerMove(to),
            SelectorEvent::PointerUp(to),
        ]);

        let Some(rect) = outcome.rect else {
            println!("Selection cancelled");
            return Ok(());
        };
        println!("Selected {}", rect);

        if let Some(record) = service.capture(CaptureTarget::Region(rect)).await? {
            println!("✓ Saved record {} ({} bytes)", record.id, record.file_size_bytes);
        }

        let history = service.history().await;
        println!("\nCatalog holds {} screenshot(s)", history.len());
        for record in history.iter().take(5) {
            println!("  #{} {} {}x{} {}", record.id, record.kind, record.width, record.height, record.captured_at);
        }

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
