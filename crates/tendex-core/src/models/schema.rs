//! The fixed 44-field lot schema.
//!
//! The schema is an ordered mapping from field key to semantic type and
//! category. It is fixed at compile time and immutable at runtime; every lot
//! record carries exactly these fields, each nullable.

use serde::{Deserialize, Serialize};

/// Semantic type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free text.
    Text,
    /// Closed vocabulary (universe, status, procedure type...).
    Enum,
    /// Calendar date, canonical form DD/MM/YYYY.
    Date,
    /// Monetary amount in euros.
    Currency,
    /// Whole number (counts, durations).
    Integer,
    /// Yes/no flag.
    Boolean,
}

/// Broad grouping of schema fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldCategory {
    /// Identifies the procedure or lot (reference, titles, awardee).
    Identity,
    /// Dates and durations.
    Dates,
    /// Amounts and commercial terms.
    Money,
    /// Taxonomy and closed-vocabulary fields.
    Classification,
    /// Unconstrained notes and descriptions.
    FreeText,
}

/// One of the 44 schema fields.
///
/// Declaration order is the published column order; `ALL` iterates in that
/// order and `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    MotsCles,
    Univers,
    Segment,
    Famille,
    Statut,
    Groupement,
    ReferenceProcedure,
    TypeProcedure,
    MonoMulti,
    ExecutionMarche,
    DateLimite,
    DateAttribution,
    DureeMarche,
    Reconduction,
    FinSansReconduction,
    FinAvecReconduction,
    NbrLots,
    IntituleProcedure,
    LotNumero,
    IntituleLot,
    InfosComplementaires,
    Attributaire,
    ProduitRetenu,
    Remarques,
    NotesAcheteurProcedure,
    NotesAcheteurFournisseur,
    NotesAcheteurPositionnement,
    NoteVeille,
    Achat,
    CreditBail,
    CreditBailDuree,
    Location,
    LocationDuree,
    Mad,
    MontantGlobalEstime,
    MontantGlobalMaxi,
    QuantiteMinimum,
    QuantitesEstimees,
    QuantiteMaximum,
    CriteresEconomique,
    CriteresTechniques,
    AutresCriteres,
    Rse,
    ContributionFournisseur,
}

impl FieldKey {
    /// Every schema field, in published column order.
    pub const ALL: [FieldKey; 44] = [
        FieldKey::MotsCles,
        FieldKey::Univers,
        FieldKey::Segment,
        FieldKey::Famille,
        FieldKey::Statut,
        FieldKey::Groupement,
        FieldKey::ReferenceProcedure,
        FieldKey::TypeProcedure,
        FieldKey::MonoMulti,
        FieldKey::ExecutionMarche,
        FieldKey::DateLimite,
        FieldKey::DateAttribution,
        FieldKey::DureeMarche,
        FieldKey::Reconduction,
        FieldKey::FinSansReconduction,
        FieldKey::FinAvecReconduction,
        FieldKey::NbrLots,
        FieldKey::IntituleProcedure,
        FieldKey::LotNumero,
        FieldKey::IntituleLot,
        FieldKey::InfosComplementaires,
        FieldKey::Attributaire,
        FieldKey::ProduitRetenu,
        FieldKey::Remarques,
        FieldKey::NotesAcheteurProcedure,
        FieldKey::NotesAcheteurFournisseur,
        FieldKey::NotesAcheteurPositionnement,
        FieldKey::NoteVeille,
        FieldKey::Achat,
        FieldKey::CreditBail,
        FieldKey::CreditBailDuree,
        FieldKey::Location,
        FieldKey::LocationDuree,
        FieldKey::Mad,
        FieldKey::MontantGlobalEstime,
        FieldKey::MontantGlobalMaxi,
        FieldKey::QuantiteMinimum,
        FieldKey::QuantitesEstimees,
        FieldKey::QuantiteMaximum,
        FieldKey::CriteresEconomique,
        FieldKey::CriteresTechniques,
        FieldKey::AutresCriteres,
        FieldKey::Rse,
        FieldKey::ContributionFournisseur,
    ];

    /// Stable technical name, matching the serde representation.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKey::MotsCles => "mots_cles",
            FieldKey::Univers => "univers",
            FieldKey::Segment => "segment",
            FieldKey::Famille => "famille",
            FieldKey::Statut => "statut",
            FieldKey::Groupement => "groupement",
            FieldKey::ReferenceProcedure => "reference_procedure",
            FieldKey::TypeProcedure => "type_procedure",
            FieldKey::MonoMulti => "mono_multi",
            FieldKey::ExecutionMarche => "execution_marche",
            FieldKey::DateLimite => "date_limite",
            FieldKey::DateAttribution => "date_attribution",
            FieldKey::DureeMarche => "duree_marche",
            FieldKey::Reconduction => "reconduction",
            FieldKey::FinSansReconduction => "fin_sans_reconduction",
            FieldKey::FinAvecReconduction => "fin_avec_reconduction",
            FieldKey::NbrLots => "nbr_lots",
            FieldKey::IntituleProcedure => "intitule_procedure",
            FieldKey::LotNumero => "lot_numero",
            FieldKey::IntituleLot => "intitule_lot",
            FieldKey::InfosComplementaires => "infos_complementaires",
            FieldKey::Attributaire => "attributaire",
            FieldKey::ProduitRetenu => "produit_retenu",
            FieldKey::Remarques => "remarques",
            FieldKey::NotesAcheteurProcedure => "notes_acheteur_procedure",
            FieldKey::NotesAcheteurFournisseur => "notes_acheteur_fournisseur",
            FieldKey::NotesAcheteurPositionnement => "notes_acheteur_positionnement",
            FieldKey::NoteVeille => "note_veille",
            FieldKey::Achat => "achat",
            FieldKey::CreditBail => "credit_bail",
            FieldKey::CreditBailDuree => "credit_bail_duree",
            FieldKey::Location => "location",
            FieldKey::LocationDuree => "location_duree",
            FieldKey::Mad => "mad",
            FieldKey::MontantGlobalEstime => "montant_global_estime",
            FieldKey::MontantGlobalMaxi => "montant_global_maxi",
            FieldKey::QuantiteMinimum => "quantite_minimum",
            FieldKey::QuantitesEstimees => "quantites_estimees",
            FieldKey::QuantiteMaximum => "quantite_maximum",
            FieldKey::CriteresEconomique => "criteres_economique",
            FieldKey::CriteresTechniques => "criteres_techniques",
            FieldKey::AutresCriteres => "autres_criteres",
            FieldKey::Rse => "rse",
            FieldKey::ContributionFournisseur => "contribution_fournisseur",
        }
    }

    /// Published French column label (pure lookup, used by exporters).
    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::MotsCles => "Mots clés",
            FieldKey::Univers => "Univers",
            FieldKey::Segment => "Segment",
            FieldKey::Famille => "Famille",
            FieldKey::Statut => "Statut",
            FieldKey::Groupement => "Groupement",
            FieldKey::ReferenceProcedure => "Référence de la procédure",
            FieldKey::TypeProcedure => "Type de procédure",
            FieldKey::MonoMulti => "Mono ou multi-attributif",
            FieldKey::ExecutionMarche => "Exécution du marché",
            FieldKey::DateLimite => "Date limite de remise des offres",
            FieldKey::DateAttribution => "Date d'attribution du marché",
            FieldKey::DureeMarche => "Durée du marché (mois)",
            FieldKey::Reconduction => "Reconduction",
            FieldKey::FinSansReconduction => "Fin (sans reconduction)",
            FieldKey::FinAvecReconduction => "Fin (avec reconduction)",
            FieldKey::NbrLots => "Nbr lots",
            FieldKey::IntituleProcedure => "Intitulé de la procédure",
            FieldKey::LotNumero => "Lot N°",
            FieldKey::IntituleLot => "Intitulé du Lot",
            FieldKey::InfosComplementaires => "Infos complémentaires",
            FieldKey::Attributaire => "Attributaire",
            FieldKey::ProduitRetenu => "Produit retenu",
            FieldKey::Remarques => "Remarques",
            FieldKey::NotesAcheteurProcedure => "Notes de l'acheteur sur la procédure",
            FieldKey::NotesAcheteurFournisseur => "Notes de l'acheteur sur le fournisseur",
            FieldKey::NotesAcheteurPositionnement => "Notes de l'acheteur sur le positionnement",
            FieldKey::NoteVeille => "Note Veille concurrentielle disponible",
            FieldKey::Achat => "Achat",
            FieldKey::CreditBail => "Crédit bail",
            FieldKey::CreditBailDuree => "Crédit bail (durée année)",
            FieldKey::Location => "Location",
            FieldKey::LocationDuree => "Location (durée années)",
            FieldKey::Mad => "MAD",
            FieldKey::MontantGlobalEstime => "Montant global estimé (€ HT) du marché",
            FieldKey::MontantGlobalMaxi => "Montant global maxi (€ HT)",
            FieldKey::QuantiteMinimum => "Quantité minimum",
            FieldKey::QuantitesEstimees => "Quantités estimées",
            FieldKey::QuantiteMaximum => "Quantité maximum",
            FieldKey::CriteresEconomique => "Critères d'attribution : économique",
            FieldKey::CriteresTechniques => "Critères d'attribution : techniques",
            FieldKey::AutresCriteres => "Autres critères d'attribution",
            FieldKey::Rse => "RSE",
            FieldKey::ContributionFournisseur => "Contribution fournisseur",
        }
    }

    /// Semantic type of this field.
    pub fn field_type(&self) -> FieldType {
        use FieldKey::*;
        match self {
            DateLimite | DateAttribution | FinSansReconduction | FinAvecReconduction => {
                FieldType::Date
            }
            MontantGlobalEstime | MontantGlobalMaxi => FieldType::Currency,
            DureeMarche | NbrLots | LotNumero | CreditBailDuree | LocationDuree
            | QuantiteMinimum | QuantiteMaximum => FieldType::Integer,
            NoteVeille | Achat | CreditBail | Location | Mad => FieldType::Boolean,
            Univers | Segment | Famille | Statut | TypeProcedure | MonoMulti | Reconduction => {
                FieldType::Enum
            }
            _ => FieldType::Text,
        }
    }

    /// Category grouping of this field.
    pub fn category(&self) -> FieldCategory {
        use FieldKey::*;
        match self {
            Groupement | ReferenceProcedure | NbrLots | IntituleProcedure | LotNumero
            | IntituleLot | Attributaire => FieldCategory::Identity,
            DateLimite | DateAttribution | DureeMarche | FinSansReconduction
            | FinAvecReconduction | CreditBailDuree | LocationDuree => FieldCategory::Dates,
            MontantGlobalEstime | MontantGlobalMaxi | QuantiteMinimum | QuantiteMaximum => {
                FieldCategory::Money
            }
            Univers | Segment | Famille | Statut | TypeProcedure | MonoMulti | Reconduction
            | NoteVeille | Achat | CreditBail | Location | Mad => FieldCategory::Classification,
            _ => FieldCategory::FreeText,
        }
    }

    /// Whether the field varies per lot rather than per document.
    ///
    /// Document-level fields are shared by every record of a multi-lot
    /// procedure; lot-level fields are filled per segmented lot.
    pub fn is_lot_specific(&self) -> bool {
        use FieldKey::*;
        matches!(
            self,
            LotNumero
                | IntituleLot
                | Attributaire
                | ProduitRetenu
                | InfosComplementaires
                | MontantGlobalEstime
                | MontantGlobalMaxi
                | QuantiteMinimum
                | QuantitesEstimees
                | QuantiteMaximum
                | CriteresEconomique
                | CriteresTechniques
                | AutresCriteres
                | Rse
                | ContributionFournisseur
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_has_44_fields() {
        assert_eq!(FieldKey::ALL.len(), 44);
    }

    #[test]
    fn test_field_order_is_stable() {
        assert_eq!(FieldKey::ALL[0], FieldKey::MotsCles);
        assert_eq!(FieldKey::ALL[43], FieldKey::ContributionFournisseur);
        // Ord follows declaration order.
        assert!(FieldKey::MotsCles < FieldKey::Univers);
        assert!(FieldKey::Rse < FieldKey::ContributionFournisseur);
    }

    #[test]
    fn test_field_types() {
        assert_eq!(FieldKey::DateLimite.field_type(), FieldType::Date);
        assert_eq!(FieldKey::MontantGlobalEstime.field_type(), FieldType::Currency);
        assert_eq!(FieldKey::NbrLots.field_type(), FieldType::Integer);
        assert_eq!(FieldKey::Mad.field_type(), FieldType::Boolean);
        assert_eq!(FieldKey::Univers.field_type(), FieldType::Enum);
        assert_eq!(FieldKey::Remarques.field_type(), FieldType::Text);
    }

    #[test]
    fn test_lot_specific_fields() {
        assert!(FieldKey::IntituleLot.is_lot_specific());
        assert!(FieldKey::MontantGlobalEstime.is_lot_specific());
        assert!(!FieldKey::ReferenceProcedure.is_lot_specific());
        assert!(!FieldKey::NbrLots.is_lot_specific());
    }

    #[test]
    fn test_serde_name_matches() {
        let json = serde_json::to_string(&FieldKey::ReferenceProcedure).unwrap();
        assert_eq!(json, "\"reference_procedure\"");
        assert_eq!(FieldKey::ReferenceProcedure.name(), "reference_procedure");
    }
}
