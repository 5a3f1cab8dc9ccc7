//! Built-in game catalogs so every workshop game is playable without any
//! external config.

use crate::domain::{Classification, GameKind, LocalizedText, Prompt, QualityLevel};

fn prompt(id: &str, en: &str, es: &str) -> Prompt {
  Prompt {
    id: id.into(),
    text: LocalizedText::new(en).with_es(es),
    classification: None,
    rationale: None,
  }
}

fn category(mut p: Prompt, label: &str) -> Prompt {
  p.classification = Some(Classification::Category(label.into()));
  p
}

fn level(mut p: Prompt, n: u8) -> Prompt {
  // seed levels are literals in 1..=4
  p.classification = QualityLevel::try_from(n).ok().map(Classification::Level);
  p
}

fn why(mut p: Prompt, en: &str, es: &str) -> Prompt {
  p.rationale = Some(LocalizedText::new(en).with_es(es));
  p
}

pub fn seed_catalog(kind: GameKind) -> Vec<Prompt> {
  match kind {
    GameKind::TimedQa => timed_qa(),
    GameKind::Classification => behavior_functions(),
    GameKind::Leveling => feedback_levels(),
    GameKind::Rewrite => positive_phrasing(),
  }
}

fn timed_qa() -> Vec<Prompt> {
  vec![
    why(
      prompt(
        "qa-transition",
        "A student refuses to line up after recess. What is your first move?",
        "Un estudiante se niega a hacer fila después del recreo. ¿Cuál es tu primer paso?",
      ),
      "Get close, lower your voice, and offer two acceptable choices before any consequence.",
      "Acércate, baja la voz y ofrece dos opciones aceptables antes de cualquier consecuencia.",
    ),
    why(
      prompt(
        "qa-shoutout",
        "Two students keep calling out answers during small group. How do you redirect?",
        "Dos estudiantes siguen gritando respuestas en el grupo pequeño. ¿Cómo los rediriges?",
      ),
      "Teach a visible signal for turns and praise the first student who uses it.",
      "Enseña una señal visible para los turnos y elogia al primer estudiante que la use.",
    ),
    why(
      prompt(
        "qa-stuck",
        "A student has stared at the same math problem for five minutes. What do you say?",
        "Un estudiante lleva cinco minutos mirando el mismo problema. ¿Qué le dices?",
      ),
      "Ask what they already know about the problem, then prompt the next smallest step.",
      "Pregunta qué sabe ya del problema y luego sugiere el siguiente paso más pequeño.",
    ),
    why(
      prompt(
        "qa-teacher-absent",
        "The lead teacher is pulled into a meeting mid-lesson. What keeps the class on track?",
        "La maestra principal sale a una reunión a mitad de la clase. ¿Qué mantiene a la clase en orden?",
      ),
      "Follow the posted routine, narrate expectations aloud, and keep the same pacing.",
      "Sigue la rutina publicada, di las expectativas en voz alta y mantén el mismo ritmo.",
    ),
    why(
      prompt(
        "qa-meltdown",
        "A student is crying and throwing materials. Who and what comes first?",
        "Un estudiante llora y lanza materiales. ¿Quién y qué va primero?",
      ),
      "Safety of everyone in the room first, then calm presence and fewer words.",
      "Primero la seguridad de todos en el salón, luego presencia tranquila y pocas palabras.",
    ),
  ]
}

fn behavior_functions() -> Vec<Prompt> {
  vec![
    why(
      category(
        prompt(
          "fn-worksheet",
          "Every time the writing worksheet comes out, Jamal asks to go to the nurse.",
          "Cada vez que sale la hoja de escritura, Jamal pide ir con la enfermera.",
        ),
        "escape",
      ),
      "The request reliably removes the demand.",
      "La petición elimina la tarea de forma constante.",
    ),
    why(
      category(
        prompt(
          "fn-tapping",
          "Maria taps her pencil constantly, even when working alone in the hallway.",
          "María golpea su lápiz todo el tiempo, incluso cuando trabaja sola en el pasillo.",
        ),
        "sensory",
      ),
      "It continues with no audience and no demand change.",
      "Continúa sin público y sin cambio en la tarea.",
    ),
    why(
      category(
        prompt(
          "fn-jokes",
          "Leo makes jokes that stop once the class stops laughing.",
          "Leo hace chistes que paran cuando la clase deja de reír.",
        ),
        "attention",
      ),
      "Peer reaction is what keeps the behavior going.",
      "La reacción de los compañeros es lo que mantiene la conducta.",
    ),
    why(
      category(
        prompt(
          "fn-ipad",
          "Ava screams until she is handed the class tablet, then stops.",
          "Ava grita hasta que le dan la tableta de la clase, y luego se calma.",
        ),
        "tangible",
      ),
      "Access to the item ends the behavior.",
      "Obtener el objeto termina la conducta.",
    ),
    why(
      category(
        prompt(
          "fn-walks",
          "Sam wanders out of reading group whenever the text gets difficult.",
          "Sam se aleja del grupo de lectura cuando el texto se vuelve difícil.",
        ),
        "escape",
      ),
      "Leaving avoids the hard task.",
      "Irse evita la tarea difícil.",
    ),
    why(
      category(
        prompt(
          "fn-calls-name",
          "Priya calls your name repeatedly while you help other students.",
          "Priya dice tu nombre repetidamente mientras ayudas a otros estudiantes.",
        ),
        "attention",
      ),
      "Adult attention is the payoff.",
      "La atención del adulto es la recompensa.",
    ),
  ]
}

fn feedback_levels() -> Vec<Prompt> {
  vec![
    why(
      level(prompt("lv-good-job", "\"Good job.\"", "\"Buen trabajo.\""), 1),
      "General praise with no information about what went well.",
      "Elogio general sin información sobre qué salió bien.",
    ),
    why(
      level(
        prompt("lv-nice-writing", "\"Nice writing today!\"", "\"¡Buena escritura hoy!\""),
        2,
      ),
      "Names the task but not the skill.",
      "Nombra la tarea pero no la habilidad.",
    ),
    why(
      level(
        prompt(
          "lv-capitals",
          "\"You remembered capital letters at the start of each sentence.\"",
          "\"Recordaste usar mayúsculas al inicio de cada oración.\"",
        ),
        3,
      ),
      "Specific about the skill the student used.",
      "Específico sobre la habilidad que usó el estudiante.",
    ),
    why(
      level(
        prompt(
          "lv-strategy",
          "\"You reread your answer and caught the mistake yourself. That strategy will help on the next problem too.\"",
          "\"Releíste tu respuesta y encontraste el error tú mismo. Esa estrategia te ayudará en el siguiente problema.\"",
        ),
        4,
      ),
      "Specific, names the strategy, and connects it to future work.",
      "Específico, nombra la estrategia y la conecta con el trabajo futuro.",
    ),
    why(
      level(prompt("lv-smart", "\"You're so smart!\"", "\"¡Eres muy inteligente!\""), 1),
      "Praises a trait rather than effort or strategy.",
      "Elogia un rasgo en lugar del esfuerzo o la estrategia.",
    ),
    why(
      level(
        prompt(
          "lv-effort",
          "\"You kept working even when the problem was hard.\"",
          "\"Seguiste trabajando aunque el problema era difícil.\"",
        ),
        3,
      ),
      "Recognizes effort specifically but stops short of next steps.",
      "Reconoce el esfuerzo de forma específica pero no da siguientes pasos.",
    ),
  ]
}

fn positive_phrasing() -> Vec<Prompt> {
  vec![
    why(
      prompt("rw-running", "Stop running!", "¡Deja de correr!"),
      "Walking feet in the hallway, please.",
      "Pies que caminan en el pasillo, por favor.",
    ),
    why(
      prompt("rw-yelling", "Don't yell at your classmates.", "No les grites a tus compañeros."),
      "Use a calm voice when you tell them how you feel.",
      "Usa una voz tranquila cuando les digas cómo te sientes.",
    ),
    why(
      prompt("rw-phones", "No phones during work time.", "Nada de teléfonos durante el trabajo."),
      "Phones stay in your backpack until the timer goes off.",
      "Los teléfonos se quedan en la mochila hasta que suene el temporizador.",
    ),
    why(
      prompt("rw-quit", "Quit giving up so fast.", "Deja de rendirte tan rápido."),
      "Try one more strategy, and then we'll check it together.",
      "Prueba una estrategia más y luego la revisamos juntos.",
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_seed_catalog_is_valid_for_its_game() {
    for kind in GameKind::ALL {
      let catalog = seed_catalog(kind);
      assert!(!catalog.is_empty(), "{kind:?} has no seeds");
      for p in &catalog {
        assert!(p.validate_for(kind).is_ok(), "{} invalid for {kind:?}", p.id);
      }
    }
  }

  #[test]
  fn seed_ids_are_unique() {
    let mut ids: Vec<String> = GameKind::ALL
      .iter()
      .flat_map(|k| seed_catalog(*k))
      .map(|p| p.id)
      .collect();
    let before = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), before);
  }
}
