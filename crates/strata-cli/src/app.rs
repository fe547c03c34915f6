//! The interactive main loop.

use crate::config::OutputConfig;
use strata_core::{
    Console, Encoder, Flow, LayerNode, LayerSelector, Menu, MenuItem, ParentContext, SessionRef,
    export,
};
use tracing::{debug, info, warn};

const PACKET: usize = 0;
const SHOW: usize = 1;
const SAVE: usize = 2;
const EXIT: usize = 3;

/// Main menu over the root layer selector.
pub struct App<C: Console> {
    console: C,
    root: LayerSelector,
    output: OutputConfig,
    /// Control rests with the root selector
    in_packet: bool,
}

impl<C: Console> App<C> {
    /// Create the application around a fresh root selector.
    pub fn new(console: C, session: SessionRef, output: OutputConfig) -> Self {
        Self {
            console,
            root: LayerSelector::new("Packet", ParentContext::Root, session),
            output,
            in_packet: false,
        }
    }

    /// Root of the packet definition
    #[must_use]
    pub fn root(&self) -> &LayerSelector {
        &self.root
    }

    /// Get the console
    #[must_use]
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Run until the operator exits or input ends.
    pub fn run(&mut self) {
        info!("session started");

        loop {
            let flow = if self.in_packet {
                self.step_packet()
            } else {
                self.step_main()
            };

            if !flow.is_continue() {
                break;
            }
            if self.console.is_closed() {
                debug!("console closed");
                break;
            }
        }

        info!(root = %self.root.name(), "session ended");
    }

    fn step_packet(&mut self) -> Flow {
        match self.root.step(&mut self.console) {
            Flow::Back => {
                self.in_packet = false;
                Flow::Continue
            }
            flow => flow,
        }
    }

    fn step_main(&mut self) -> Flow {
        let items = [
            MenuItem::with_hint("Packet", self.root.name()),
            MenuItem::new("Show packet"),
            MenuItem::new("Save packet"),
            MenuItem::new("Exit"),
        ];

        let choice = {
            let mut menu = Menu::new("Strata");
            for item in &items {
                menu.add_item(item);
            }
            self.console.prompt(&menu, Some(PACKET))
        };

        match choice {
            Some(PACKET) => self.in_packet = true,
            Some(SHOW) => self.show(),
            Some(SAVE) => self.save(),
            Some(EXIT) | None => return Flow::Exit,
            Some(other) => warn!(choice = other, "console returned an item outside the menu"),
        }
        Flow::Continue
    }

    /// Rebuild the encoder chain and return the root encoder.
    fn packet(&mut self) -> Option<Encoder> {
        self.root.refresh_encoder();
        let encoder = self.root.encoder().cloned();
        if encoder.is_none() {
            self.console
                .notify(&strata_core::Error::NothingToEncode.to_string());
        }
        encoder
    }

    fn show(&mut self) {
        if let Some(encoder) = self.packet() {
            let dump = export::format_hexdump(&encoder.encode());
            self.console.notify(dump.trim_end());
        }
    }

    fn save(&mut self) {
        let Some(encoder) = self.packet() else {
            return;
        };

        let path = &self.output.pcap_path;
        match export::save_packet(path, &encoder, self.output.snap_len) {
            Ok(len) => {
                info!(path = %path.display(), bytes = len, "packet saved");
                self.console
                    .notify(&format!("Saved {len} bytes to {}", path.display()));
            }
            Err(e) => {
                warn!(path = %path.display(), "save failed: {e}");
                self.console.notify(&format!("Save failed: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use strata_core::{Defaults, LayerKind, Session};

    #[derive(Default)]
    struct Script {
        answers: VecDeque<Option<usize>>,
        values: VecDeque<String>,
        messages: Vec<String>,
        titles: Vec<String>,
    }

    impl Script {
        fn new(answers: &[Option<usize>]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                ..Self::default()
            }
        }
    }

    impl Console for Script {
        fn prompt(&mut self, menu: &Menu<'_>, _default: Option<usize>) -> Option<usize> {
            self.titles.push(menu.title().to_string());
            self.answers.pop_front().flatten()
        }

        fn read_value(&mut self, _label: &str, _current: &str) -> Option<String> {
            self.values.pop_front()
        }

        fn notify(&mut self, message: &str) {
            self.messages.push(message.to_string());
        }

        fn is_closed(&self) -> bool {
            self.answers.is_empty()
        }
    }

    fn app(answers: &[Option<usize>], output: OutputConfig) -> App<Script> {
        App::new(Script::new(answers), Session::new(Defaults::default()), output)
    }

    #[test]
    fn test_exit_immediately() {
        let mut app = app(&[Some(EXIT)], OutputConfig::default());
        app.run();
        assert_eq!(app.console().titles, ["Strata"]);
        assert_eq!(app.root().child_count(), 0);
    }

    #[test]
    fn test_show_without_selection() {
        let mut app = app(&[Some(SHOW), Some(EXIT)], OutputConfig::default());
        app.run();
        assert_eq!(
            app.console().messages,
            ["nothing to encode: no layer selected"]
        );
    }

    #[test]
    fn test_select_text_and_show() {
        // Packet, Text-Buffer, edit Text, Back (to main), Show, Exit.
        let mut script = Script::new(&[
            Some(PACKET),
            Some(2),
            Some(0),
            Some(1),
            Some(SHOW),
            Some(EXIT),
        ]);
        script.values.push_back("hi".to_string());

        let mut app = App::new(
            script,
            Session::new(Defaults::default()),
            OutputConfig::default(),
        );
        app.run();

        assert_eq!(app.root().selected_kind(), Some(LayerKind::TextBuffer));
        assert_eq!(app.root().name(), "Text-Buffer");
        let dump = app.console().messages.last().unwrap();
        assert!(dump.contains("68 69"));
        assert!(dump.contains("|hi"));
    }

    #[test]
    fn test_save_appends_pcap() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            pcap_path: dir.path().join("out.pcap"),
            snap_len: 65535,
        };

        // Packet, Ethernet-Frame, Back (to main), Save, Exit.
        let mut app = app(
            &[Some(PACKET), Some(1), Some(4), Some(SAVE), Some(EXIT)],
            output.clone(),
        );
        app.run();

        assert_eq!(app.root().selected_kind(), Some(LayerKind::EthernetFrame));
        assert!(app.console().messages[0].starts_with("Saved 14 bytes"));
        let bytes = std::fs::read(&output.pcap_path).unwrap();
        assert_eq!(bytes.len(), 24 + 16 + 14);
    }

    #[test]
    fn test_save_refuses_mixed_link_types() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            pcap_path: dir.path().join("out.pcap"),
            snap_len: 65535,
        };

        // Save an Ethernet frame, switch the root to Text-Buffer, save again.
        let mut app = app(
            &[
                Some(PACKET),
                Some(1),
                Some(4),
                Some(SAVE),
                Some(PACKET),
                Some(2),
                Some(1),
                Some(SAVE),
                Some(EXIT),
            ],
            output.clone(),
        );
        app.run();

        assert_eq!(app.root().selected_kind(), Some(LayerKind::TextBuffer));
        let messages = &app.console().messages;
        assert_eq!(messages.len(), 2);
        assert!(messages[1].starts_with("Save failed"));
        assert!(messages[1].contains("link type mismatch"));
        let bytes = std::fs::read(&output.pcap_path).unwrap();
        assert_eq!(bytes.len(), 24 + 16 + 14);
    }

    #[test]
    fn test_closed_input_ends_session() {
        let mut app = app(&[Some(PACKET), None], OutputConfig::default());
        app.run();
        assert_eq!(app.console().titles, ["Strata", "Packet"]);
    }
}
