//! Capturable top-level windows for a window picker

use crate::{
    capture::WindowSystem,
    error::CaptureResult,
    types::{WindowDescriptor, WindowHandle},
};

/// Snapshot of the visible, titled top-level windows, excluding `self_handle`.
///
/// Ordered by process name then title, both case-insensitive. A failed
/// process lookup leaves the process name empty instead of aborting.
pub fn list_capturable_windows(
    windows: &dyn WindowSystem,
    self_handle: Option<WindowHandle>,
) -> CaptureResult<Vec<WindowDescriptor>> {
    // Materialize the whole window set before filtering
    let handles = windows.window_handles()?;
    let total = handles.len();

    let mut descriptors: Vec<WindowDescriptor> = handles
        .into_iter()
        .filter(|&handle| Some(handle) != self_handle)
        .filter(|&handle| windows.is_visible(handle))
        .filter_map(|handle| {
            let title = windows.title(handle);
            if title.trim().is_empty() {
                return None;
            }
            let process_name = windows.process_name(handle).unwrap_or_else(|err| {
                log::debug!("process lookup for window {} failed: {}", handle, err);
                String::new()
            });
            Some(WindowDescriptor::new(handle, title, process_name))
        })
        .collect();

    descriptors.sort_by_cached_key(|d| (d.process_name.to_lowercase(), d.title.to_lowercase()));

    log::debug!("{} of {} windows are capturable", descriptors.len(), total);
    Ok(descriptors)
}
