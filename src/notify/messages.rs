//! Chat message templates.
//!
//! The channel audience is Portuguese-speaking, like the catalog codes.

use crate::engine::tracker::Settlement;
use crate::strategy::Signal;

pub const MONITORING: &str = "MONITORANDO A MESA🤌";

/// Reply to `/start`.
pub const START: &str = "Bot de monitoramento de Bac Bo iniciado! 🤌";

pub fn signal(signal: &Signal) -> String {
    format!(
        "ATENÇÃO PADRÃO {} DETECTADO\n\
         Entrar no {}: {}\n\
         Proteger o empate: 🟡\n\
         Fazer até 1 gale 🔥\n\
         Mais dinheiro e menos amigos 🤏",
        signal.pattern_id,
        signal.side,
        signal.side.symbol().emoji(),
    )
}

pub fn settlement(settlement: &Settlement) -> String {
    match settlement {
        Settlement::Win { streak, .. } => {
            format!("Mais Dinheiro no bolso🤌\nPlacar de acertos: {streak} ✅")
        }
        Settlement::GaleEntered { .. } => "Vamos entrar no 1 Gale🔥".to_string(),
        Settlement::GaleLost { .. } => {
            "Perdemos no 1 Gale😔, vamos pegar a outra rodada🤌".to_string()
        }
    }
}
