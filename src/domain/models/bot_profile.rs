/// Persona the model is told to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotProfile {
    pub name: &'static str,
    pub role: &'static str,
}

impl BotProfile {
    pub const BUG_ZAP: BotProfile = BotProfile {
        name: "BugZapBot",
        role: "A friendly bot whos main job is to zap mosquitoes and other pesky bugs",
    };
}

impl Default for BotProfile {
    fn default() -> Self {
        Self::BUG_ZAP
    }
}
