//! [`WindowManager`] implementation backed by i3 / sway IPC.
//!
//! Communicates directly with the window manager through the Unix socket
//! named by `$SWAYSOCK` or `$I3SOCK`, without spawning `i3-msg` or
//! `swaymsg`.
//!
//! # Wire format
//!
//! Requests and replies share one framing:
//!
//! ```text
//! "i3-ipc" <payload length: u32 LE> <message type: u32 LE> <payload>
//! ```

use crate::command::{CommandOutcome, OutputInfo, WindowInfo, WorkspaceInfo};
use crate::traits::WindowManager;
use log::debug;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 6] = b"i3-ipc";
const HEADER_LEN: usize = MAGIC.len() + 8;

/// Message types used by wmpick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    RunCommand = 0,
    GetWorkspaces = 1,
    GetOutputs = 3,
    GetTree = 4,
}

/// i3- or sway-backed window manager.
///
/// Each method call opens a short-lived connection to the IPC socket.
pub struct I3Wm {
    socket: PathBuf,
}

/// Errors that can occur when talking to i3 / sway.
#[derive(Debug, thiserror::Error)]
#[error("i3 IPC error: {0}")]
pub struct I3WmError(String);

impl I3Wm {
    /// Locate the socket through `$SWAYSOCK`, then `$I3SOCK`.
    pub fn new() -> Result<Self, I3WmError> {
        let socket = ["SWAYSOCK", "I3SOCK"]
            .iter()
            .find_map(|var| std::env::var_os(var).filter(|v| !v.is_empty()))
            .map(PathBuf::from)
            .ok_or_else(|| I3WmError("neither SWAYSOCK nor I3SOCK is set".into()))?;
        Ok(Self::with_socket(socket))
    }

    pub fn with_socket(socket: impl AsRef<Path>) -> Self {
        Self {
            socket: socket.as_ref().to_path_buf(),
        }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Send one message and return the reply payload.
    fn request(&self, kind: MessageType, payload: &str) -> Result<String, I3WmError> {
        let mut stream = UnixStream::connect(&self.socket)
            .map_err(|e| I3WmError(format!("connect to {}: {}", self.socket.display(), e)))?;

        stream
            .write_all(&encode_message(kind, payload))
            .map_err(|e| I3WmError(format!("write: {}", e)))?;

        let mut header = [0u8; HEADER_LEN];
        stream
            .read_exact(&mut header)
            .map_err(|e| I3WmError(format!("read header: {}", e)))?;
        let (len, reply_kind) = decode_header(&header)?;
        if reply_kind != kind as u32 {
            return Err(I3WmError(format!(
                "reply type {} does not match request type {}",
                reply_kind, kind as u32
            )));
        }

        let mut body = vec![0u8; len];
        stream
            .read_exact(&mut body)
            .map_err(|e| I3WmError(format!("read payload: {}", e)))?;
        String::from_utf8(body).map_err(|e| I3WmError(format!("utf-8: {}", e)))
    }

    fn query<T: for<'de> Deserialize<'de>>(&self, kind: MessageType) -> Result<T, I3WmError> {
        let json = self.request(kind, "")?;
        serde_json::from_str(&json).map_err(|e| I3WmError(format!("parse: {}", e)))
    }
}

/// Frame `payload` as a message of type `kind`.
pub fn encode_message(kind: MessageType, payload: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(&(kind as u32).to_le_bytes());
    buf.extend_from_slice(payload.as_bytes());
    buf
}

/// Split a reply header into payload length and message type.
fn decode_header(header: &[u8; HEADER_LEN]) -> Result<(usize, u32), I3WmError> {
    if &header[..MAGIC.len()] != MAGIC {
        return Err(I3WmError("bad magic in reply".into()));
    }
    let len = u32::from_le_bytes([header[6], header[7], header[8], header[9]]);
    let kind = u32::from_le_bytes([header[10], header[11], header[12], header[13]]);
    Ok((len as usize, kind))
}

//  Minimal serde structs for the JSON we care about

/// Subset of a node of the `GET_TREE` reply.
#[derive(Deserialize)]
struct NodeJson {
    id: i64,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    focused: bool,
    /// X11 window id (i3, XWayland clients on sway).
    #[serde(default)]
    window: Option<i64>,
    /// Wayland app id (sway).
    #[serde(default)]
    app_id: Option<String>,
    #[serde(default)]
    window_properties: Option<WindowPropertiesJson>,
    #[serde(default)]
    nodes: Vec<NodeJson>,
    #[serde(default)]
    floating_nodes: Vec<NodeJson>,
}

#[derive(Deserialize)]
struct WindowPropertiesJson {
    #[serde(default)]
    class: Option<String>,
}

#[derive(Deserialize)]
struct WorkspaceJson {
    num: i32,
    name: String,
    output: String,
    focused: bool,
    visible: bool,
}

#[derive(Deserialize)]
struct OutputJson {
    name: String,
    active: bool,
    #[serde(default)]
    current_workspace: Option<String>,
}

#[derive(Deserialize)]
struct CommandResultJson {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

const SCRATCH_WORKSPACE: &str = "__i3_scratch";

impl NodeJson {
    fn holds_client(&self) -> bool {
        self.window.is_some() || self.app_id.is_some()
    }

    /// Walk the tree, collecting every client window outside the scratchpad.
    fn collect_windows(&self, workspace: Option<&str>, out: &mut Vec<WindowInfo>) {
        let workspace = if self.kind == "workspace" {
            self.name.as_deref()
        } else {
            workspace
        };
        if workspace == Some(SCRATCH_WORKSPACE) {
            return;
        }
        if self.nodes.is_empty() && self.floating_nodes.is_empty() && self.holds_client() {
            let app = self
                .app_id
                .clone()
                .or_else(|| self.window_properties.as_ref().and_then(|p| p.class.clone()))
                .unwrap_or_default();
            out.push(WindowInfo {
                id: self.id,
                window: self.window,
                title: self.name.clone().unwrap_or_default(),
                app,
                workspace: workspace.unwrap_or_default().to_string(),
                focused: self.focused,
            });
            return;
        }
        for child in self.nodes.iter().chain(&self.floating_nodes) {
            child.collect_windows(workspace, out);
        }
    }
}

/// Extract the client windows from a `GET_TREE` reply.
fn windows_from_tree(json: &str) -> Result<Vec<WindowInfo>, I3WmError> {
    let root: NodeJson =
        serde_json::from_str(json).map_err(|e| I3WmError(format!("parse: {}", e)))?;
    let mut windows = Vec::new();
    root.collect_windows(None, &mut windows);
    Ok(windows)
}

//  WindowManager implementation

impl WindowManager for I3Wm {
    type Error = I3WmError;

    fn get_windows(&self) -> Result<Vec<WindowInfo>, Self::Error> {
        let windows = windows_from_tree(&self.request(MessageType::GetTree, "")?)?;
        debug!("found {} window(s)", windows.len());
        Ok(windows)
    }

    fn get_workspaces(&self) -> Result<Vec<WorkspaceInfo>, Self::Error> {
        let workspaces: Vec<WorkspaceJson> = self.query(MessageType::GetWorkspaces)?;
        Ok(workspaces
            .into_iter()
            .map(|w| WorkspaceInfo {
                num: w.num,
                name: w.name,
                output: w.output,
                focused: w.focused,
                visible: w.visible,
            })
            .collect())
    }

    fn get_outputs(&self) -> Result<Vec<OutputInfo>, Self::Error> {
        let outputs: Vec<OutputJson> = self.query(MessageType::GetOutputs)?;
        Ok(outputs
            .into_iter()
            .map(|o| OutputInfo {
                name: o.name,
                active: o.active,
                current_workspace: o.current_workspace,
            })
            .collect())
    }

    fn command(&self, command: &str) -> Result<Vec<CommandOutcome>, Self::Error> {
        debug!("run command {:?}", command);
        let json = self.request(MessageType::RunCommand, command)?;
        let results: Vec<CommandResultJson> =
            serde_json::from_str(&json).map_err(|e| I3WmError(format!("parse: {}", e)))?;
        Ok(results
            .into_iter()
            .map(|r| CommandOutcome {
                success: r.success,
                error: r.error,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::net::UnixListener;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Monotonic counter to generate unique socket paths per test.
    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!("wmpick-test-{}-{}.sock", std::process::id(), id))
    }

    const TREE: &str = r#"{
        "id": 1, "type": "root", "name": "root",
        "nodes": [
            { "id": 2, "type": "output", "name": "__i3",
              "nodes": [
                { "id": 3, "type": "con", "name": "content",
                  "nodes": [
                    { "id": 4, "type": "workspace", "name": "__i3_scratch",
                      "floating_nodes": [
                        { "id": 5, "type": "floating_con", "name": "hidden",
                          "nodes": [ { "id": 6, "type": "con", "name": "scratch term",
                                       "window": 77, "nodes": [] } ] }
                      ] }
                  ] }
              ] },
            { "id": 10, "type": "output", "name": "DP-1",
              "nodes": [
                { "id": 11, "type": "con", "name": "content",
                  "nodes": [
                    { "id": 12, "type": "workspace", "name": "1",
                      "nodes": [
                        { "id": 13, "type": "con", "name": "vim", "focused": true,
                          "window": 4194307,
                          "window_properties": { "class": "URxvt" }, "nodes": [] },
                        { "id": 14, "type": "con", "name": null,
                          "nodes": [
                            { "id": 15, "type": "con", "name": "Firefox",
                              "app_id": "firefox", "nodes": [] }
                          ] }
                      ],
                      "floating_nodes": [
                        { "id": 16, "type": "floating_con", "name": "calc",
                          "app_id": "qalculate", "nodes": [] }
                      ] },
                    { "id": 20, "type": "workspace", "name": "2: empty", "nodes": [] }
                  ] }
              ] }
        ]
    }"#;

    #[test]
    fn encodes_header() {
        let msg = encode_message(MessageType::RunCommand, "workspace 1");
        assert_eq!(&msg[..6], b"i3-ipc");
        assert_eq!(&msg[6..10], &11u32.to_le_bytes());
        assert_eq!(&msg[10..14], &0u32.to_le_bytes());
        assert_eq!(&msg[14..], b"workspace 1");
    }

    #[test]
    fn rejects_bad_magic() {
        let mut header = [0u8; HEADER_LEN];
        header[..6].copy_from_slice(b"i3-ipx");
        assert!(decode_header(&header).is_err());
    }

    #[test]
    fn collects_leaf_windows() {
        let windows = windows_from_tree(TREE).unwrap();
        let ids: Vec<i64> = windows.iter().map(|w| w.id).collect();
        assert_eq!(ids, [13, 15, 16]);

        assert_eq!(windows[0].title, "vim");
        assert_eq!(windows[0].app, "URxvt");
        assert_eq!(windows[0].window, Some(4194307));
        assert_eq!(windows[0].workspace, "1");
        assert!(windows[0].focused);

        assert_eq!(windows[1].app, "firefox");
        assert_eq!(windows[1].window, None);
        assert!(!windows[1].focused);

        assert_eq!(windows[2].title, "calc");
    }

    #[test]
    fn scratchpad_windows_are_skipped() {
        let windows = windows_from_tree(TREE).unwrap();
        assert!(windows.iter().all(|w| w.id != 6));
    }

    /// Serve exactly one request on `path`, answering with `reply`, and
    /// hand back the raw request.
    fn serve_once(
        path: &Path,
        reply_kind: u32,
        reply: &'static str,
    ) -> std::thread::JoinHandle<(u32, String)> {
        let listener = UnixListener::bind(path).expect("bind");
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut header = [0u8; HEADER_LEN];
            stream.read_exact(&mut header).unwrap();
            let (len, kind) = decode_header(&header).unwrap();
            let mut body = vec![0u8; len];
            stream.read_exact(&mut body).unwrap();

            let mut out = Vec::new();
            out.extend_from_slice(MAGIC);
            out.extend_from_slice(&(reply.len() as u32).to_le_bytes());
            out.extend_from_slice(&reply_kind.to_le_bytes());
            out.extend_from_slice(reply.as_bytes());
            stream.write_all(&out).unwrap();
            (kind, String::from_utf8(body).unwrap())
        })
    }

    #[test]
    fn command_round_trip_over_socket() {
        let path = tmp_socket_path();
        let server = serve_once(
            &path,
            0,
            r#"[{"success":true},{"success":false,"error":"No such workspace"}]"#,
        );

        let wm = I3Wm::with_socket(&path);
        let outcomes = wm.command("workspace \"1\"; workspace nope").unwrap();
        assert_eq!(
            outcomes,
            [
                CommandOutcome {
                    success: true,
                    error: None
                },
                CommandOutcome {
                    success: false,
                    error: Some("No such workspace".into())
                },
            ]
        );

        let (kind, body) = server.join().unwrap();
        assert_eq!(kind, MessageType::RunCommand as u32);
        assert_eq!(body, "workspace \"1\"; workspace nope");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn workspaces_over_socket() {
        let path = tmp_socket_path();
        let server = serve_once(
            &path,
            1,
            r#"[{"num":1,"name":"1","output":"DP-1","focused":true,"visible":true,"urgent":false}]"#,
        );

        let wm = I3Wm::with_socket(&path);
        let ws = wm.get_workspaces().unwrap();
        assert_eq!(ws.len(), 1);
        assert_eq!(ws[0].name, "1");
        assert_eq!(ws[0].output, "DP-1");
        assert!(ws[0].focused);

        server.join().unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn mismatched_reply_type_is_error() {
        let path = tmp_socket_path();
        let server = serve_once(&path, 4, "[]");

        let wm = I3Wm::with_socket(&path);
        assert!(wm.get_outputs().is_err());

        server.join().unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_socket_is_error() {
        let wm = I3Wm::with_socket("/nonexistent/wmpick.sock");
        let err = wm.command("nop").unwrap_err();
        assert!(err.to_string().contains("connect to"));
    }
}
