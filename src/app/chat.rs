//! Chat input and conversation state

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;

use super::bridge::{ChatInputBridge, InputEdit, Registration};
use super::edit::EditBuffer;
use crate::api::{ApiError, ChatRequest, Message, StreamEvent};
use crate::curriculum::Lesson;
use crate::curriculum::objectives;

/// A canned prompt the student can start a message with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetPrompt {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    /// Prefix inserted into the input; also identifies the message type
    pub text: &'static str,
    pub highlighted: bool,
}

pub const PRESET_PROMPTS: &[PresetPrompt] = &[
    PresetPrompt {
        id: "multiple-choice",
        label: "أنشئ سؤال اختيار متعدد",
        description: "إنشاء أسئلة تفاعلية مع خيارات متعددة لاختبار فهمك للموضوع",
        text: "أنشئ سؤال اختيار من متعدد حول هذا الموضوع: ",
        highlighted: true,
    },
    PresetPrompt {
        id: "explain",
        label: "اشرح هذا",
        description: "تقديم شرح بسيط وواضح للنص لمساعدتك على فهمه بشكل أفضل",
        text: "اشرح هذا النص بطريقة بسيطة وواضحة: ",
        highlighted: false,
    },
    PresetPrompt {
        id: "rephrase",
        label: "أعد الصياغة",
        description: "إعادة كتابة النص بأسلوب أبسط وأوضح للفهم مع الحفاظ على المعنى الأصلي",
        text: "هل يمكنك إعادة صياغة هذه الفكرة بأسلوب أوضح: ",
        highlighted: false,
    },
    PresetPrompt {
        id: "test-understanding",
        label: "اختبر فهمي",
        description: "إنشاء سؤال أو تمرين قصير لاختبار مدى فهمك للمحتوى",
        text: "اختبر فهمي لهذا الموضوع من خلال إنشاء سؤال تطبيقي: ",
        highlighted: false,
    },
    PresetPrompt {
        id: "translate",
        label: "ترجم إلى العربية",
        description: "تحويل النصوص من لغات أخرى إلى اللغة العربية بدقة ووضوح",
        text: "هل يمكنك ترجمة هذا النص إلى اللغة العربية: ",
        highlighted: false,
    },
    PresetPrompt {
        id: "practice-activity",
        label: "اقترح نشاط تعليمي",
        description: "إنشاء أنشطة عملية وتطبيقية تساعد على تعزيز المهارات وفهم المفاهيم",
        text: "هل يمكنك اقتراح نشاط تعليمي مرتبط بهذا الموضوع: ",
        highlighted: false,
    },
];

/// Look up a preset by id
pub fn preset(id: &str) -> Option<&'static PresetPrompt> {
    PRESET_PROMPTS.iter().find(|p| p.id == id)
}

/// Practice prompts for a lesson: one for the lesson, one per objective
pub fn practice_prompts(lesson: &Lesson) -> Vec<String> {
    let mut prompts = Vec::with_capacity(lesson.objectives.len() + 1);
    if let Some(p) = preset("multiple-choice") {
        prompts.push(format!("{}{}", p.text, lesson.title));
    }
    if let Some(p) = preset("test-understanding") {
        prompts.extend(
            lesson
                .objectives
                .iter()
                .map(|o| objectives::clean_text(&o.text).trim())
                .filter(|t| !t.is_empty())
                .map(|t| format!("{}{}", p.text, t)),
        );
    }
    prompts
}

/// The chat input line.
///
/// Receives edits from [`ChatInputBridge`] while mounted.
#[derive(Debug, Default)]
pub struct ChatInput {
    buffer: EditBuffer,
    /// Preset prefix the current text starts with
    message_type: Option<&'static str>,
    edits: Option<(Registration, UnboundedReceiver<InputEdit>)>,
}

impl ChatInput {
    /// Register with the bridge so popup actions reach this input
    pub fn mount(&mut self, bridge: &mut ChatInputBridge) {
        self.edits = Some(bridge.register());
    }

    pub fn unmount(&mut self, bridge: &mut ChatInputBridge) {
        if let Some((registration, _)) = self.edits.take() {
            bridge.unregister(&registration);
        }
    }

    /// Apply any edits sent through the bridge. Returns whether any arrived.
    pub fn sync(&mut self) -> bool {
        let mut pending = Vec::new();
        if let Some((_, rx)) = self.edits.as_mut() {
            while let Ok(edit) = rx.try_recv() {
                pending.push(edit);
            }
        }
        let changed = !pending.is_empty();
        for edit in pending {
            self.apply(edit);
        }
        changed
    }

    /// Replace the input, re-prepending the active prefix when asked to
    pub fn apply(&mut self, edit: InputEdit) {
        match self.message_type.filter(|_| edit.preserve_message_type) {
            Some(prefix) => self.set_text(format!("{prefix}{}", edit.text)),
            None => self.set_text(edit.text),
        }
    }

    /// Start the input with a preset prompt
    pub fn apply_preset(&mut self, preset: &PresetPrompt) {
        self.buffer.set(preset.text);
        self.message_type = Some(preset.text);
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer.set(text);
        self.refresh_message_type();
    }

    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn cursor(&self) -> usize {
        self.buffer.cursor()
    }

    pub fn message_type(&self) -> Option<&'static str> {
        self.message_type
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.text().trim().is_empty()
    }

    /// Take the text for sending
    pub fn take(&mut self) -> String {
        self.message_type = None;
        self.buffer.take()
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert_char(c);
        self.refresh_message_type();
    }

    pub fn delete_char(&mut self) {
        self.buffer.delete_char();
        self.refresh_message_type();
    }

    pub fn delete_char_forward(&mut self) {
        self.buffer.delete_char_forward();
        self.refresh_message_type();
    }

    pub fn move_left(&mut self) {
        self.buffer.move_left();
    }

    pub fn move_right(&mut self) {
        self.buffer.move_right();
    }

    pub fn move_start(&mut self) {
        self.buffer.move_start();
    }

    pub fn move_end(&mut self) {
        self.buffer.move_end();
    }

    fn refresh_message_type(&mut self) {
        let text = self.buffer.text();
        self.message_type = PRESET_PROMPTS.iter().find(|p| text.starts_with(p.text)).map(|p| p.text);
    }
}

/// Conversation with the tutor
#[derive(Debug)]
pub struct ChatState {
    pub messages: Vec<Message>,
    /// Assistant text received so far for the reply in flight
    pub pending: String,
    pub error: Option<String>,
    /// Lines scrolled up from the bottom
    pub scroll: usize,
    chat_id: String,
    /// Sequence number of the reply in flight and its cancel token
    in_flight: Option<(u64, CancellationToken)>,
    /// Survives `clear` so replies to a dropped conversation stay stale
    next_seq: u64,
}

/// A chat request ready for the runtime to send
#[derive(Debug)]
pub struct OutgoingChat {
    /// Tags every stream event belonging to this request
    pub seq: u64,
    pub request: ChatRequest,
    pub cancel: CancellationToken,
}

impl Default for ChatState {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            pending: String::new(),
            error: None,
            scroll: 0,
            chat_id: new_chat_id(),
            in_flight: None,
            next_seq: 1,
        }
    }
}

fn new_chat_id() -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    format!("chat-{nanos:x}")
}

impl ChatState {
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    pub fn is_streaming(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether `seq` tags the reply currently streaming
    fn is_current(&self, seq: u64) -> bool {
        matches!(&self.in_flight, Some((current, _)) if *current == seq)
    }

    /// Append a user message and build the request for it.
    ///
    /// Returns `None` while a reply is still streaming or for blank text.
    pub fn begin(&mut self, text: String) -> Option<OutgoingChat> {
        if self.is_streaming() || text.trim().is_empty() {
            return None;
        }

        self.messages.push(Message::user(text.trim()));
        self.pending.clear();
        self.error = None;
        self.scroll = 0;

        let seq = self.next_seq;
        self.next_seq += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some((seq, cancel.clone()));
        tracing::info!("Sending message {} in {} (#{})", self.messages.len(), self.chat_id, seq);
        let request = ChatRequest::new(self.chat_id.clone(), self.messages.clone());
        Some(OutgoingChat { seq, request, cancel })
    }

    /// Apply a stream event; events from an earlier request are dropped
    pub fn apply_event(&mut self, seq: u64, event: StreamEvent) {
        if !self.is_current(seq) {
            tracing::debug!("Dropping stale chat event for #{}", seq);
            return;
        }
        match event {
            StreamEvent::TextDelta { text } => self.pending.push_str(&text),
            StreamEvent::Error { message } => {
                tracing::warn!("Chat stream error: {}", message);
                self.error = Some(message);
            }
            StreamEvent::Finish { reason } => {
                tracing::debug!("Chat step finished: {:?}", reason);
            }
        }
    }

    /// The request ended; keep whatever text arrived
    pub fn finish(&mut self, seq: u64, result: Result<(), ApiError>) {
        if !self.is_current(seq) {
            tracing::debug!("Ignoring end of stale chat request #{}", seq);
            return;
        }
        self.in_flight = None;
        if !self.pending.trim().is_empty() {
            let reply = std::mem::take(&mut self.pending);
            self.messages.push(Message::assistant(reply));
        }
        self.pending.clear();

        match result {
            Ok(()) | Err(ApiError::Cancelled) => {}
            Err(e) => {
                tracing::error!("Chat request failed: {}", e);
                self.error = Some(e.user_message());
            }
        }
    }

    /// Interrupt the reply in flight
    pub fn cancel(&self) {
        if let Some((_, token)) = &self.in_flight {
            token.cancel();
        }
    }

    /// Start a fresh conversation
    pub fn clear(&mut self) {
        self.cancel();
        let next_seq = self.next_seq;
        *self = Self { next_seq, ..Self::default() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::Objective;
    use pretty_assertions::assert_eq;

    #[test]
    fn bridge_edits_reach_mounted_input() {
        let mut bridge = ChatInputBridge::new();
        let mut input = ChatInput::default();
        input.mount(&mut bridge);

        bridge.insert("لخص \"النص\"", false);
        assert!(input.sync());
        assert_eq!(input.text(), "لخص \"النص\"");
        assert!(!input.sync());

        input.unmount(&mut bridge);
        assert!(!bridge.insert("x", false));
    }

    #[test]
    fn preserve_reprepends_active_prefix() {
        let explain = preset("explain").unwrap();
        let mut input = ChatInput::default();
        input.apply_preset(explain);
        assert_eq!(input.message_type(), Some(explain.text));

        input.apply(InputEdit { text: "الفقرة".into(), preserve_message_type: true });
        assert_eq!(input.text(), format!("{}الفقرة", explain.text));
        assert_eq!(input.message_type(), Some(explain.text));
    }

    #[test]
    fn without_preserve_input_is_replaced() {
        let mut input = ChatInput::default();
        input.apply_preset(preset("translate").unwrap());
        input.apply(InputEdit { text: "جديد".into(), preserve_message_type: false });
        assert_eq!(input.text(), "جديد");
        assert_eq!(input.message_type(), None);
    }

    #[test]
    fn preserve_without_prefix_replaces() {
        let mut input = ChatInput::default();
        input.set_text("سؤال حر");
        input.apply(InputEdit { text: "اقتباس".into(), preserve_message_type: true });
        assert_eq!(input.text(), "اقتباس");
    }

    #[test]
    fn typing_tracks_message_type() {
        let rephrase = preset("rephrase").unwrap();
        let mut input = ChatInput::default();
        input.set_text(rephrase.text);
        assert_eq!(input.message_type(), Some(rephrase.text));

        input.move_start();
        input.delete_char_forward();
        assert_eq!(input.message_type(), None);
    }

    #[test]
    fn take_resets_input() {
        let mut input = ChatInput::default();
        input.apply_preset(preset("explain").unwrap());
        input.insert_char('x');
        assert!(input.take().ends_with('x'));
        assert!(input.is_empty());
        assert_eq!(input.message_type(), None);
    }

    #[test]
    fn practice_prompts_cover_lesson_and_objectives() {
        let lesson = Lesson {
            id: 1,
            title: "الجملة الاسمية".into(),
            content: None,
            objectives: vec![
                Objective { id: 1, text: "قراءة: يقرأ النص قراءة صحيحة".into() },
                Objective { id: 2, text: "   ".into() },
            ],
        };
        let prompts = practice_prompts(&lesson);
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].ends_with("الجملة الاسمية"));
        assert!(prompts[1].ends_with("يقرأ النص قراءة صحيحة"));
    }

    #[test]
    fn begin_builds_request_with_history() {
        let mut chat = ChatState::default();
        let outgoing = chat.begin("  ما الفاعل؟ ".into()).unwrap();
        assert_eq!(outgoing.request.id, chat.chat_id());
        assert_eq!(outgoing.request.messages, vec![Message::user("ما الفاعل؟")]);
        assert!(chat.is_streaming());

        // No second request while streaming
        assert!(chat.begin("again".into()).is_none());
    }

    #[test]
    fn blank_messages_are_not_sent() {
        let mut chat = ChatState::default();
        assert!(chat.begin("   ".into()).is_none());
        assert!(chat.messages.is_empty());
    }

    #[test]
    fn streamed_reply_becomes_message() {
        let mut chat = ChatState::default();
        let seq = chat.begin("سؤال".into()).unwrap().seq;
        chat.apply_event(seq, StreamEvent::TextDelta { text: "الفاعل ".into() });
        chat.apply_event(seq, StreamEvent::TextDelta { text: "اسم مرفوع".into() });
        assert_eq!(chat.pending, "الفاعل اسم مرفوع");

        chat.finish(seq, Ok(()));
        assert!(!chat.is_streaming());
        assert_eq!(chat.messages.last(), Some(&Message::assistant("الفاعل اسم مرفوع")));
        assert!(chat.pending.is_empty());
    }

    #[test]
    fn cancelled_reply_keeps_partial_text_without_error() {
        let mut chat = ChatState::default();
        let outgoing = chat.begin("سؤال".into()).unwrap();
        chat.apply_event(outgoing.seq, StreamEvent::TextDelta { text: "جزء".into() });
        chat.cancel();
        assert!(outgoing.cancel.is_cancelled());

        chat.finish(outgoing.seq, Err(ApiError::Cancelled));
        assert_eq!(chat.error, None);
        assert_eq!(chat.messages.len(), 2);
    }

    #[test]
    fn failed_request_sets_error() {
        let mut chat = ChatState::default();
        let seq = chat.begin("سؤال".into()).unwrap().seq;
        chat.finish(seq, Err(ApiError::ApiError { status: 500, message: "boom".into() }));
        assert!(chat.error.is_some());
        assert_eq!(chat.messages.len(), 1);
    }

    #[test]
    fn clear_starts_new_conversation() {
        let mut chat = ChatState::default();
        chat.begin("سؤال".into());
        chat.clear();
        assert!(chat.messages.is_empty());
        assert!(!chat.is_streaming());
    }

    #[test]
    fn cleared_conversation_ignores_old_stream() {
        let mut chat = ChatState::default();
        let old = chat.begin("سؤال قديم".into()).unwrap();
        chat.clear();
        assert!(old.cancel.is_cancelled());

        chat.apply_event(old.seq, StreamEvent::TextDelta { text: "رد قديم".into() });
        chat.finish(old.seq, Err(ApiError::Cancelled));
        assert!(chat.messages.is_empty());
        assert!(chat.pending.is_empty());
    }

    #[test]
    fn stale_finish_keeps_new_reply_streaming() {
        let mut chat = ChatState::default();
        let old = chat.begin("الأول".into()).unwrap();
        chat.clear();
        let new = chat.begin("الثاني".into()).unwrap();
        assert_ne!(old.seq, new.seq);

        chat.finish(old.seq, Err(ApiError::Cancelled));
        assert!(chat.is_streaming());
        assert!(chat.begin("الثالث".into()).is_none());

        chat.apply_event(new.seq, StreamEvent::TextDelta { text: "جواب".into() });
        chat.finish(new.seq, Ok(()));
        assert_eq!(chat.messages, vec![Message::user("الثاني"), Message::assistant("جواب")]);
    }
}
