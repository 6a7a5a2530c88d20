use bevy::prelude::*;

use super::script::Speaker;
use super::session::ConversationSurface;

/// What the dialogue box should show this frame. The session writes here;
/// `ui::dialogue_box` copies it onto the UI entities when it changes.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct DialogueView {
    pub visible: bool,
    pub speaker: Option<Speaker>,
    pub bilingual: bool,
    pub primary: String,
    pub secondary: String,
    pub choices: Vec<String>,
}

impl ConversationSurface for DialogueView {
    fn show_conversation(&mut self, speaker: &Speaker, bilingual: bool) {
        self.visible = true;
        self.speaker = Some(speaker.clone());
        self.bilingual = bilingual;
        self.primary.clear();
        self.secondary.clear();
        self.choices.clear();
    }

    fn hide_conversation(&mut self) {
        self.visible = false;
        self.speaker = None;
        self.primary.clear();
        self.secondary.clear();
    }

    fn set_primary_text(&mut self, text: &str) {
        if self.primary != text {
            self.primary = text.to_string();
        }
    }

    fn set_secondary_text(&mut self, text: &str) {
        if self.bilingual && self.secondary != text {
            self.secondary = text.to_string();
        }
    }

    fn render_choices(&mut self, labels: &[String]) {
        self.choices = labels.to_vec();
    }

    fn clear_choices(&mut self) {
        self.choices.clear();
    }
}
