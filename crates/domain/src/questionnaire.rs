// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Questionnaire structure and answers.
//!
//! A request type is made of ordered steps, each holding questions. Choosing
//! an option may open linked sub-questions, which become part of the
//! questionnaire only while that option is selected.

use crate::types::TypeDemande;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Question asking whether the applicant wants an accompaniment.
///
/// Fixed reference-data row: renumbering it silently changes
/// `demande_avec_accompagnement`.
pub const QUESTION_ACCOMPAGNEMENT_ID: i64 = 12;

/// The "no" option of [`QUESTION_ACCOMPAGNEMENT_ID`].
pub const OPTION_ACCOMPAGNEMENT_NON_ID: i64 = 42;

/// Contact field of the applicant an answer is copied into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChampCible {
    /// Personal phone.
    TelPerso,
    /// Personal e-mail.
    EmailPerso,
    /// Emergency contact.
    ContactUrgence,
}

/// Reference table an answer selects entries from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableLiee {
    /// Disability typologies.
    TypologieHandicap,
}

/// One step of a questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Etape {
    /// Identifier.
    pub id: i64,
    /// Display label.
    pub libelle: String,
    /// Top-level questions of the step.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A question of a request questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier.
    pub id: i64,
    /// Display label.
    pub libelle: String,
    /// Whether an answer is required.
    #[serde(default)]
    pub obligatoire: bool,
    /// Applicant field the answer is copied into when a beneficiary is derived.
    #[serde(default)]
    pub champ_cible: Option<ChampCible>,
    /// Reference table the answer picks entries from.
    #[serde(default)]
    pub table_liee: Option<TableLiee>,
    /// Selectable options.
    #[serde(default)]
    pub options: Vec<OptionReponse>,
}

/// A selectable option, possibly opening sub-questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionReponse {
    /// Identifier.
    pub id: i64,
    /// Display label.
    pub libelle: String,
    /// Questions shown when this option is selected.
    #[serde(default)]
    pub questions_liees: Vec<Question>,
}

/// A file uploaded as part of an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fichier {
    /// Storage identifier.
    pub id: i64,
    /// Original file name.
    pub nom: String,
}

/// The applicant's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reponse {
    /// The question answered.
    pub question_id: i64,
    /// Selected option ids.
    #[serde(default)]
    pub options: Vec<i64>,
    /// Free-text value.
    #[serde(default)]
    pub commentaire: Option<String>,
    /// Selected disability typologies.
    #[serde(default)]
    pub typologies: Vec<i64>,
    /// Attached files.
    #[serde(default)]
    pub pieces_jointes: Vec<Fichier>,
}

impl Reponse {
    /// Creates an empty answer to a question.
    #[must_use]
    pub const fn new(question_id: i64) -> Self {
        Self {
            question_id,
            options: Vec::new(),
            commentaire: None,
            typologies: Vec::new(),
            pieces_jointes: Vec::new(),
        }
    }

    /// Returns true if the answer carries any value.
    #[must_use]
    pub fn is_answered(&self) -> bool {
        !self.options.is_empty()
            || self
                .commentaire
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty())
            || !self.typologies.is_empty()
            || !self.pieces_jointes.is_empty()
    }
}

impl TypeDemande {
    /// Walks every question of the type, linked sub-questions included.
    #[must_use]
    pub fn questions(&self) -> Vec<&Question> {
        fn collect<'a>(question: &'a Question, out: &mut Vec<&'a Question>) {
            out.push(question);
            for option in &question.options {
                for linked in &option.questions_liees {
                    collect(linked, out);
                }
            }
        }

        let mut out: Vec<&Question> = Vec::new();
        for etape in &self.etapes {
            for question in &etape.questions {
                collect(question, &mut out);
            }
        }
        out
    }

    /// Finds a question anywhere in the questionnaire.
    #[must_use]
    pub fn question(&self, question_id: i64) -> Option<&Question> {
        self.questions().into_iter().find(|q| q.id == question_id)
    }
}

/// Returns true when every required question reachable from the answers has
/// been answered.
///
/// A linked sub-question is only reachable while the option opening it is
/// selected.
#[must_use]
pub fn is_complete(type_demande: &TypeDemande, reponses: &[Reponse]) -> bool {
    let by_question: BTreeMap<i64, &Reponse> = reponses
        .iter()
        .map(|reponse| (reponse.question_id, reponse))
        .collect();

    type_demande
        .etapes
        .iter()
        .flat_map(|etape| etape.questions.iter())
        .all(|question| question_satisfied(question, &by_question))
}

fn question_satisfied(question: &Question, reponses: &BTreeMap<i64, &Reponse>) -> bool {
    let Some(reponse) = reponses.get(&question.id).filter(|r| r.is_answered()) else {
        return !question.obligatoire;
    };

    question
        .options
        .iter()
        .filter(|option| reponse.options.contains(&option.id))
        .flat_map(|option| option.questions_liees.iter())
        .all(|linked| question_satisfied(linked, reponses))
}
