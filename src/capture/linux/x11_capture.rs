//! X11-based screen capture for Linux

use std::fmt::Display;

use crate::{
    capture::traits::{DefaultPixelConverter, PixelFormatConverter},
    error::{CaptureError, CaptureResult},
    types::{CaptureRect, CapturedImage, DisplayInfo, PixelFormat, WindowHandle, WindowRect},
};

use x11rb::{
    connection::Connection,
    protocol::{
        randr,
        xproto::{
            self, Atom, AtomEnum, ClientMessageEvent, ConnectionExt as XprotoConnectionExt,
            EventMask, ImageFormat, MapState, Window,
        },
    },
    rust_connection::RustConnection,
    CURRENT_TIME,
};

/// Longest property value read, in 32-bit units
const MAX_PROPERTY_LENGTH: u32 = 4096;

/// EWMH atoms interned once per connection
struct Atoms {
    net_client_list: Atom,
    net_active_window: Atom,
    net_wm_name: Atom,
    net_wm_pid: Atom,
    utf8_string: Atom,
}

fn intern(connection: &RustConnection, name: &[u8]) -> CaptureResult<Atom> {
    Ok(connection
        .intern_atom(false, name)
        .map_err(platform("InternAtom"))?
        .reply()
        .map_err(platform("InternAtom reply"))?
        .atom)
}

fn platform<E: Display>(context: &'static str) -> impl Fn(E) -> CaptureError {
    move |e| CaptureError::PlatformError(format!("X11 {} error: {}", context, e))
}

fn window_id(handle: WindowHandle) -> Option<Window> {
    Window::try_from(handle.raw()).ok()
}

/// X11 capture implementation
pub struct X11Capture {
    connection: RustConnection,
    screen_num: usize,
    root_window: Window,
    atoms: Atoms,
    pixel_converter: DefaultPixelConverter,
}

impl X11Capture {
    /// Create a new X11 capturer
    pub fn new() -> CaptureResult<Self> {
        let (connection, screen_num) = RustConnection::connect(None).map_err(|e| {
            CaptureError::PlatformError(format!("Failed to connect to X11: {}", e))
        })?;

        let root_window = connection.setup().roots[screen_num].root;

        let atoms = Atoms {
            net_client_list: intern(&connection, b"_NET_CLIENT_LIST")?,
            net_active_window: intern(&connection, b"_NET_ACTIVE_WINDOW")?,
            net_wm_name: intern(&connection, b"_NET_WM_NAME")?,
            net_wm_pid: intern(&connection, b"_NET_WM_PID")?,
            utf8_string: intern(&connection, b"UTF8_STRING")?,
        };

        Ok(Self {
            connection,
            screen_num,
            root_window,
            atoms,
            pixel_converter: DefaultPixelConverter,
        })
    }

    /// Enumerate displays using XRandR
    ///
    /// X11 has no per-monitor scale, so every display reports 1.0.
    pub fn get_displays(&self) -> CaptureResult<Vec<DisplayInfo>> {
        let enumeration = |e: &dyn Display| {
            CaptureError::DisplayEnumerationFailed(format!("XRandR error: {}", e))
        };

        let resources = randr::get_screen_resources_current(&self.connection, self.root_window)
            .map_err(|e| enumeration(&e))?
            .reply()
            .map_err(|e| enumeration(&e))?;

        let primary_output = randr::get_output_primary(&self.connection, self.root_window)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|reply| reply.output)
            .unwrap_or(0);

        let mut displays = Vec::new();
        for &crtc in &resources.crtcs {
            let crtc_info = randr::get_crtc_info(&self.connection, crtc, resources.config_timestamp)
                .map_err(|e| enumeration(&e))?
                .reply()
                .map_err(|e| enumeration(&e))?;

            // Skip disabled CRTCs
            if crtc_info.mode == 0 || crtc_info.outputs.is_empty() {
                continue;
            }

            let index = displays.len();
            let name = crtc_info
                .outputs
                .first()
                .and_then(|&output| self.output_name(output, resources.config_timestamp))
                .unwrap_or_else(|| format!("Display {}", index + 1));

            displays.push(DisplayInfo {
                index,
                name,
                width: crtc_info.width as u32,
                height: crtc_info.height as u32,
                x: crtc_info.x as i32,
                y: crtc_info.y as i32,
                scale_factor: 1.0,
                is_primary: primary_output != 0 && crtc_info.outputs.contains(&primary_output),
            });
        }

        // Without a primary output set, the first CRTC is treated as primary
        if !displays.is_empty() && !displays.iter().any(|d| d.is_primary) {
            displays[0].is_primary = true;
        }

        if displays.is_empty() {
            // Fallback to root window dimensions if XRandR reports nothing
            let screen = &self.connection.setup().roots[self.screen_num];
            displays.push(DisplayInfo {
                index: 0,
                name: "Primary Display".to_string(),
                width: screen.width_in_pixels as u32,
                height: screen.height_in_pixels as u32,
                x: 0,
                y: 0,
                scale_factor: 1.0,
                is_primary: true,
            });
        }

        Ok(displays)
    }

    fn output_name(&self, output: randr::Output, timestamp: u32) -> Option<String> {
        let info = randr::get_output_info(&self.connection, output, timestamp)
            .ok()?
            .reply()
            .ok()?;
        Some(String::from_utf8_lossy(&info.name).into_owned())
    }

    /// Capture a specific region of the root window
    pub fn capture_region(&self, rect: CaptureRect) -> CaptureResult<CapturedImage> {
        let geometry = || CaptureError::InvalidGeometry {
            width: rect.width() as i64,
            height: rect.height() as i64,
        };
        let x = i16::try_from(rect.x()).map_err(|_| geometry())?;
        let y = i16::try_from(rect.y()).map_err(|_| geometry())?;
        let width = u16::try_from(rect.width()).map_err(|_| geometry())?;
        let height = u16::try_from(rect.height()).map_err(|_| geometry())?;

        let image_reply = xproto::get_image(
            &self.connection,
            ImageFormat::Z_PIXMAP,
            self.root_window,
            x,
            y,
            width,
            height,
            !0, // All planes
        )
        .map_err(|e| CaptureError::CaptureFailed(format!("X11 GetImage error: {}", e)))?
        .reply()
        .map_err(|e| CaptureError::CaptureFailed(format!("X11 GetImage reply error: {}", e)))?;

        let expected = rect.width() as usize * rect.height() as usize * 4;
        if !matches!(image_reply.depth, 24 | 32) || image_reply.data.len() != expected {
            return Err(CaptureError::CaptureFailed(format!(
                "Unsupported pixel layout: depth {}, {} bytes for {}",
                image_reply.depth,
                image_reply.data.len(),
                rect
            )));
        }

        let mut data = image_reply.data;
        if self.is_bgr_format() {
            self.pixel_converter.convert_bgrx_to_rgba(&mut data);
        } else {
            for pixel in data.chunks_exact_mut(4) {
                pixel[3] = 0xFF;
            }
        }

        CapturedImage::new(data, rect.width(), rect.height(), PixelFormat::RGBA8)
    }

    /// Check if the root visual stores blue in the lowest byte
    fn is_bgr_format(&self) -> bool {
        let setup = self.connection.setup();
        let screen = &setup.roots[self.screen_num];
        screen
            .allowed_depths
            .iter()
            .flat_map(|depth| &depth.visuals)
            .find(|v| v.visual_id == screen.root_visual)
            .map(|visual| visual.blue_mask < visual.red_mask)
            .unwrap_or(true)
    }

    /// Managed top-level windows, from the window manager's client list
    pub fn client_windows(&self) -> CaptureResult<Vec<WindowHandle>> {
        let reply = self
            .connection
            .get_property(
                false,
                self.root_window,
                self.atoms.net_client_list,
                AtomEnum::WINDOW,
                0,
                MAX_PROPERTY_LENGTH,
            )
            .map_err(platform("GetProperty(_NET_CLIENT_LIST)"))?
            .reply()
            .map_err(platform("GetProperty(_NET_CLIENT_LIST) reply"))?;

        let handles: Vec<WindowHandle> = reply
            .value32()
            .map(|ids| ids.map(|id| WindowHandle::from_raw(id as u64)).collect())
            .unwrap_or_default();
        Ok(handles)
    }

    pub fn is_window(&self, handle: WindowHandle) -> bool {
        self.map_state(handle).is_some()
    }

    pub fn is_viewable(&self, handle: WindowHandle) -> bool {
        self.map_state(handle) == Some(MapState::VIEWABLE)
    }

    fn map_state(&self, handle: WindowHandle) -> Option<MapState> {
        let window = window_id(handle)?;
        let attributes = self
            .connection
            .get_window_attributes(window)
            .ok()?
            .reply()
            .ok()?;
        Some(attributes.map_state)
    }

    /// `_NET_WM_NAME`, falling back to the legacy `WM_NAME`
    pub fn title(&self, handle: WindowHandle) -> String {
        let Some(window) = window_id(handle) else {
            return String::new();
        };

        self.string_property(window, self.atoms.net_wm_name, self.atoms.utf8_string)
            .filter(|title| !title.is_empty())
            .or_else(|| {
                self.string_property(window, AtomEnum::WM_NAME.into(), AtomEnum::STRING.into())
            })
            .unwrap_or_default()
    }

    fn string_property(&self, window: Window, property: Atom, kind: Atom) -> Option<String> {
        let reply = self
            .connection
            .get_property(false, window, property, kind, 0, MAX_PROPERTY_LENGTH)
            .ok()?
            .reply()
            .ok()?;
        Some(String::from_utf8_lossy(&reply.value).into_owned())
    }

    /// Command name of the process that owns the window, via `_NET_WM_PID`
    pub fn process_name(&self, handle: WindowHandle) -> CaptureResult<String> {
        let window = window_id(handle).ok_or(CaptureError::InvalidHandle(handle))?;

        let pid = self
            .connection
            .get_property(false, window, self.atoms.net_wm_pid, AtomEnum::CARDINAL, 0, 1)
            .map_err(platform("GetProperty(_NET_WM_PID)"))?
            .reply()
            .map_err(platform("GetProperty(_NET_WM_PID) reply"))?
            .value32()
            .and_then(|mut values| values.next())
            .ok_or_else(|| {
                CaptureError::PlatformError(format!("window {} has no _NET_WM_PID", handle))
            })?;

        let comm = std::fs::read_to_string(format!("/proc/{}/comm", pid))?;
        Ok(comm.trim_end().to_string())
    }

    /// Window geometry translated to root coordinates
    pub fn window_rect(&self, handle: WindowHandle) -> CaptureResult<WindowRect> {
        let window = window_id(handle).ok_or(CaptureError::InvalidHandle(handle))?;
        let invalid = |_| CaptureError::InvalidHandle(handle);

        let geometry = self
            .connection
            .get_geometry(window)
            .map_err(platform("GetGeometry"))?
            .reply()
            .map_err(invalid)?;

        let origin = self
            .connection
            .translate_coordinates(window, self.root_window, 0, 0)
            .map_err(platform("TranslateCoordinates"))?
            .reply()
            .map_err(invalid)?;

        let left = origin.dst_x as i32;
        let top = origin.dst_y as i32;
        Ok(WindowRect::new(
            left,
            top,
            left + geometry.width as i32,
            top + geometry.height as i32,
        ))
    }

    /// Ask the window manager to activate the window (EWMH `_NET_ACTIVE_WINDOW`)
    pub fn activate(&self, handle: WindowHandle) -> bool {
        let Some(window) = window_id(handle) else {
            return false;
        };

        // Source indication 2: request from a pager, honored without focus stealing checks
        let event = ClientMessageEvent::new(
            32,
            window,
            self.atoms.net_active_window,
            [2, CURRENT_TIME, 0, 0, 0],
        );

        let sent = self
            .connection
            .send_event(
                false,
                self.root_window,
                EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY,
                event,
            )
            .map_err(platform("SendEvent"))
            .and_then(|_| self.connection.flush().map_err(platform("flush")));

        match sent {
            Ok(()) => true,
            Err(e) => {
                log::debug!("{}", e);
                false
            }
        }
    }
}
