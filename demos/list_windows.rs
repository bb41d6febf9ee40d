//! List the windows a picker would offer, then capture the first one

use snapcap::{CaptureTarget, CatalogStore, Capturer, ScreenshotService, SettingsStore};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("Snapcap - Window Picker Example");
    println!("===============================\n");

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async {
        let backend = Capturer::new()?;
        let settings = SettingsStore::default_location().load();
        let service = ScreenshotService::new(backend, CatalogStore::default_location(), settings);

        let windows = service.list_windows(None).await;
        println!("Found {} capturable window(s):", windows.len());
        for window in &windows {
            println!("  {:>12}  {}", window.handle.to_string(), window.display_name);
        }

        let Some(first) = windows.first() else {
            println!("\nNothing to capture");
            return Ok(());
        };

        println!("\nCapturing '{}'...", first.display_name);
        match service.capture(CaptureTarget::Window(first.handle)).await? {
            Some(record) => println!(
                "✓ Record {}: {}x{} -> {:?}",
                record.id, record.width, record.height, record.file_path
            ),
            None => println!("⚠️ Window could not be captured"),
        }

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
