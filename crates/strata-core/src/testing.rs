//! Scripted console and recording layers for unit tests.

use crate::defaults::Defaults;
use crate::encoder::{Encoder, TextBuffer};
use crate::grammar::LayerKind;
use crate::layer::{Flow, LayerFactory, LayerNode, Session, SessionRef};
use crate::menu::{Console, Menu};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Console replaying canned answers; `None` once the script runs out.
#[derive(Default)]
pub(crate) struct ScriptedConsole {
    answers: VecDeque<Option<usize>>,
    values: VecDeque<Option<String>>,
    defaults: Vec<Option<usize>>,
    menus: Vec<Vec<String>>,
    hints: Vec<Vec<String>>,
    messages: Vec<String>,
}

impl ScriptedConsole {
    pub(crate) fn new(answers: impl IntoIterator<Item = Option<usize>>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub(crate) fn with_values<'a>(mut self, values: impl IntoIterator<Item = &'a str>) -> Self {
        self.values = values.into_iter().map(|v| Some(v.to_string())).collect();
        self
    }

    /// Default passed to each prompt, in order.
    pub(crate) fn defaults(&self) -> Vec<Option<usize>> {
        self.defaults.clone()
    }

    /// Labels of every menu shown, in order.
    pub(crate) fn menus(&self) -> &[Vec<String>] {
        &self.menus
    }

    /// Hints of every menu shown, in order.
    pub(crate) fn hints(&self) -> &[Vec<String>] {
        &self.hints
    }

    pub(crate) fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl Console for ScriptedConsole {
    fn prompt(&mut self, menu: &Menu<'_>, default: Option<usize>) -> Option<usize> {
        self.defaults.push(default);
        self.menus
            .push(menu.items().iter().map(|item| item.label().to_string()).collect());
        self.hints
            .push(menu.items().iter().map(|item| item.hint().to_string()).collect());
        self.answers.pop_front().flatten()
    }

    fn read_value(&mut self, _label: &str, _current: &str) -> Option<String> {
        self.values.pop_front().flatten()
    }

    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

#[derive(Default)]
struct Counters {
    created: Vec<LayerKind>,
    selects: HashMap<LayerKind, usize>,
    resumes: HashMap<LayerKind, usize>,
    refreshes: HashMap<LayerKind, usize>,
    dropped: usize,
}

/// Shared record of what stub layers went through.
#[derive(Clone, Default)]
pub(crate) struct StubLog(Rc<RefCell<Counters>>);

impl StubLog {
    pub(crate) fn created(&self) -> Vec<LayerKind> {
        self.0.borrow().created.clone()
    }

    pub(crate) fn selects(&self, kind: LayerKind) -> usize {
        self.0.borrow().selects.get(&kind).copied().unwrap_or(0)
    }

    pub(crate) fn resumes(&self, kind: LayerKind) -> usize {
        self.0.borrow().resumes.get(&kind).copied().unwrap_or(0)
    }

    pub(crate) fn refreshes(&self, kind: LayerKind) -> usize {
        self.0.borrow().refreshes.get(&kind).copied().unwrap_or(0)
    }

    pub(crate) fn dropped(&self) -> usize {
        self.0.borrow().dropped
    }
}

/// Leaf stand-in that hands control straight back when stepped.
pub(crate) struct StubLayer {
    kind: LayerKind,
    log: StubLog,
    encoder: Encoder,
}

impl LayerNode for StubLayer {
    fn name(&self) -> String {
        self.kind.name().to_string()
    }

    fn encoder(&self) -> Option<&Encoder> {
        Some(&self.encoder)
    }

    fn refresh_encoder(&mut self) {
        *self.log.0.borrow_mut().refreshes.entry(self.kind).or_default() += 1;
    }

    fn step(&mut self, _console: &mut dyn Console) -> Flow {
        Flow::Back
    }

    fn on_select(&mut self) {
        *self.log.0.borrow_mut().selects.entry(self.kind).or_default() += 1;
    }

    fn on_resume(&mut self) {
        *self.log.0.borrow_mut().resumes.entry(self.kind).or_default() += 1;
    }
}

impl Drop for StubLayer {
    fn drop(&mut self) {
        self.log.0.borrow_mut().dropped += 1;
    }
}

struct StubFactory(StubLog);

impl LayerFactory for StubFactory {
    fn create(&self, kind: LayerKind, _session: &SessionRef) -> Box<dyn LayerNode> {
        self.0.0.borrow_mut().created.push(kind);
        Box::new(StubLayer {
            kind,
            log: self.0.clone(),
            encoder: Encoder::Text(TextBuffer {
                text: kind.name().to_string(),
            }),
        })
    }
}

/// Session whose selectors build stub layers.
pub(crate) fn stub_session() -> (SessionRef, StubLog) {
    let log = StubLog::default();
    let session = Session::with_factory(Defaults::default(), StubFactory(log.clone()));
    (session, log)
}
