// src/analyze/types.rs
//! Structured payload returned by the analysis service.
//!
//! The core treats this as an opaque value: it stores it, lets the operator
//! edit `draft_response`, and hands it to the commit sink. Wire strings are
//! the French labels the downstream database expects, hence the serde
//! renames.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MailCategory {
    #[serde(rename = "Renseignements")]
    Renseignements,
    #[serde(rename = "PEC")]
    Pec,
    #[serde(rename = "Factures")]
    Factures,
    #[serde(rename = "Spams")]
    Spams,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MailSubCategory {
    #[serde(rename = "Séminaires")]
    Seminaires,
    #[serde(rename = "Nuitée(s)")]
    Nuitees,
    #[serde(rename = "Restauration")]
    Restauration,
    #[serde(rename = "N/A")]
    Na,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DossierStatus {
    #[serde(rename = "Nouveau")]
    Nouveau,
    #[serde(rename = "En attente d'informations du client")]
    AttenteClient,
    #[serde(rename = "En attente d'action de l'hôtel")]
    AttenteHotel,
    #[serde(rename = "Option posée")]
    Option,
    #[serde(rename = "Confirmé")]
    Confirme,
    #[serde(rename = "Clos")]
    Clos,
}

/// Head count as the model reports it: either a number or free text like
/// "environ 20".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonCount {
    Number(u32),
    Text(String),
}

impl Default for PersonCount {
    fn default() -> Self {
        PersonCount::Text(String::new())
    }
}

/// Key/value facts extracted from the mail body. All fields default so a
/// partially filled model response still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInfo {
    #[serde(default)]
    pub nom_client: String,
    #[serde(default)]
    pub societe: String,
    #[serde(default)]
    pub dates_sejour: String,
    #[serde(default)]
    pub nb_personnes: PersonCount,
    #[serde(default)]
    pub type_prestation: String,
    #[serde(default)]
    pub budget_evoque: String,
    #[serde(default)]
    pub demandes_specifiques: String,
    #[serde(default)]
    pub urgence: bool,
    #[serde(default)]
    pub langue_mail: String,
}

/// Full analysis of one mail: summary, classification, extracted facts and a
/// draft reply. `draft_response` is the only field the operator may edit
/// after receipt (and only while the item is Done).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub category: MailCategory,
    pub sub_category: MailSubCategory,
    pub status: DossierStatus,
    #[serde(default)]
    pub extracted_info: ExtractedInfo,
    pub draft_response: String,
}
