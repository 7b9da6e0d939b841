//! Regex pattern tables for the extractable schema fields.
//!
//! Per field, patterns are ordered by priority: index 0 is the most specific
//! phrasing, later entries are progressively looser fallbacks. The first
//! capture group of every pattern carries the raw value.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::schema::FieldKey;

fn rx(pattern: &str) -> Regex {
    // Patterns are compile-time constants, a failure here is a programming
    // error caught by the test below.
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern {pattern:?}: {e}"))
}

lazy_static! {
    /// Field to prioritized pattern list.
    pub static ref FIELD_PATTERNS: HashMap<FieldKey, Vec<Regex>> = {
        let mut m: HashMap<FieldKey, Vec<Regex>> = HashMap::new();

        m.insert(FieldKey::ReferenceProcedure, vec![
            rx(r"(?i)r[ée]f[ée]rence\s+(?:de\s+la\s+)?(?:proc[ée]dure|consultation|march[ée])\s*:?\s*([A-Z0-9][A-Z0-9_/.\-]{2,30})"),
            rx(r"(?i)n[°o]\s*(?:de\s+)?(?:proc[ée]dure|consultation|march[ée]|dossier)\s*:?\s*([A-Z0-9][A-Z0-9_/.\-]{2,30})"),
            rx(r"(?i)\br[ée]f\.?\s*:?\s*([A-Z0-9][A-Z0-9_/.\-]{4,30})"),
        ]);

        m.insert(FieldKey::TypeProcedure, vec![
            rx(r"(?i)\b(appel\s+d'offres?\s+(?:ouvert|restreint))\b"),
            rx(r"(?i)\b(proc[ée]dure\s+(?:adapt[ée]e|avec\s+n[ée]gociation|n[ée]goci[ée]e|formalis[ée]e))\b"),
            rx(r"(?i)\b(dialogue\s+comp[ée]titif|march[ée]\s+n[ée]goci[ée]|accord[\s-]cadre)\b"),
            rx(r"(?i)type\s+de\s+proc[ée]dure\s*:?\s*([^\n]{3,60})"),
        ]);

        m.insert(FieldKey::DateLimite, vec![
            rx(r"(?i)date\s+(?:et\s+heure\s+)?limite\s+de\s+(?:remise|r[ée]ception|d[ée]p[ôo]t)\s+des\s+(?:offres|plis|candidatures)\s*:?\s*([^\n]{4,40})"),
            rx(r"(?i)date\s+limite\s*:?\s*([0-9][^\n]{3,30})"),
            rx(r"(?i)(?:offres|plis)\s+(?:avant|jusqu'au)\s+le?\s*([^\n]{4,40})"),
        ]);

        m.insert(FieldKey::DateAttribution, vec![
            rx(r"(?i)date\s+d'attribution\s+(?:du\s+march[ée]\s+)?:?\s*([^\n]{4,40})"),
            rx(r"(?i)march[ée]\s+attribu[ée]\s+le\s+([^\n]{4,40})"),
            rx(r"(?i)notifi[ée]\s+le\s+([^\n]{4,40})"),
        ]);

        m.insert(FieldKey::DureeMarche, vec![
            rx(r"(?i)dur[ée]e\s+(?:du\s+march[ée]|de\s+l'accord[\s-]cadre)\s*(?:est\s+de)?\s*:?\s*(\d{1,3})\s*mois"),
            rx(r"(?i)pour\s+une\s+dur[ée]e\s+de\s+(\d{1,3})\s*mois"),
            rx(r"(?i)dur[ée]e\s*:?\s*(\d{1,3})\s*mois"),
        ]);

        m.insert(FieldKey::Reconduction, vec![
            rx(r"(?i)\b(reconductible\s+\d\s+fois|non\s+reconductible|reconduction\s+tacite|reconductible)\b"),
        ]);

        m.insert(FieldKey::NbrLots, vec![
            rx(r"(?i)(?:d[ée]compos[ée]|divis[ée]|alloti)\s+en\s+(\d{1,3})\s+lots?"),
            rx(r"(?i)nombre\s+de\s+lots?\s*:?\s*(\d{1,3})"),
            rx(r"(?i)\b(\d{1,3})\s+lots?\s+(?:distincts|s[ée]par[ée]s)"),
            rx(r"(?i)march[ée]\s+(?:comporte|comprend)\s+(\d{1,3})\s+lots?"),
        ]);

        m.insert(FieldKey::IntituleProcedure, vec![
            rx(r"(?i)(?:intitul[ée]|objet)\s+(?:de\s+la\s+consultation|de\s+la\s+proc[ée]dure|du\s+march[ée])\s*:?\s*([^\n]{8,200})"),
            rx(r"(?i)objet\s*:?\s*([^\n]{8,200})"),
        ]);

        m.insert(FieldKey::MontantGlobalEstime, vec![
            rx(r"(?i)montant\s+(?:global\s+)?estim[ée](?:\s+du\s+march[ée])?\s*(?:\(€\s*HT\))?\s*:?\s*([\d\s.,]+\s*[kM]?\s*€?)"),
            rx(r"(?i)valeur\s+estim[ée]e\s*(?:hors\s+TVA)?\s*:?\s*([\d\s.,]+\s*[kM]?\s*€?)"),
            rx(r"(?i)estim[ée]\s+[àa]\s+([\d\s.,]+\s*[kM]?\s*€)"),
        ]);

        m.insert(FieldKey::MontantGlobalMaxi, vec![
            rx(r"(?i)montant\s+(?:global\s+)?maxi(?:mum|mal)?(?:\s+du\s+march[ée])?\s*(?:\(€\s*HT\))?\s*:?\s*([\d\s.,]+\s*[kM]?\s*€?)"),
            rx(r"(?i)(?:seuil|plafond)\s+maximum\s*:?\s*([\d\s.,]+\s*[kM]?\s*€?)"),
            rx(r"(?i)maximum\s+de\s+([\d\s.,]+\s*[kM]?\s*€)"),
        ]);

        m.insert(FieldKey::Groupement, vec![
            rx(r"(?i)\b(RESAH|UNIHA|UNI\.?HA|UGAP|CAIH|CACIC|HELPEVIA|CAHPP)\b"),
            rx(r"(?i)groupement\s+de\s+commandes?\s*:?\s*([^\n]{3,60})"),
        ]);

        m.insert(FieldKey::Attributaire, vec![
            rx(r"(?i)attributaire\s*:?\s*([^\n]{3,80})"),
            rx(r"(?i)titulaire\s+du\s+(?:march[ée]|lot)\s*:?\s*([^\n]{3,80})"),
            rx(r"(?i)march[ée]\s+attribu[ée]\s+[àa]\s+(?:la\s+soci[ée]t[ée]\s+)?([^\n]{3,80})"),
        ]);

        m.insert(FieldKey::MonoMulti, vec![
            rx(r"(?i)\b(mono[\s-]attributaire|multi[\s-]attributaires?)\b"),
        ]);

        m.insert(FieldKey::ExecutionMarche, vec![
            rx(r"(?i)lieu\s+(?:principal\s+)?d'ex[ée]cution\s*:?\s*([^\n]{3,80})"),
        ]);

        m.insert(FieldKey::QuantiteMinimum, vec![
            rx(r"(?i)quantit[ée]\s+minim(?:um|ale)\s*:?\s*(\d[\d\s]{0,12})"),
            rx(r"(?i)minimum\s+de\s+(\d[\d\s]{0,12})\s+unit[ée]s"),
        ]);

        m.insert(FieldKey::QuantitesEstimees, vec![
            rx(r"(?i)quantit[ée]s?\s+(?:estim[ée]es?|pr[ée]visionnelles?)\s*:?\s*([^\n]{1,60})"),
        ]);

        m.insert(FieldKey::QuantiteMaximum, vec![
            rx(r"(?i)quantit[ée]\s+maxim(?:um|ale)\s*:?\s*(\d[\d\s]{0,12})"),
            rx(r"(?i)maximum\s+de\s+(\d[\d\s]{0,12})\s+unit[ée]s"),
        ]);

        m.insert(FieldKey::CriteresEconomique, vec![
            rx(r"(?i)(?:crit[èe]re\s+)?(?:prix|[ée]conomique|co[ûu]t)\s*:?\s*(\d{1,3})\s*%"),
        ]);

        m.insert(FieldKey::CriteresTechniques, vec![
            rx(r"(?i)(?:crit[èe]re\s+)?(?:valeur\s+)?technique\s*:?\s*(\d{1,3})\s*%"),
        ]);

        m.insert(FieldKey::AutresCriteres, vec![
            rx(r"(?i)(?:crit[èe]re\s+)?(?:d[ée]lai|livraison|service\s+apr[èe]s[\s-]vente|sav)\s*:?\s*(\d{1,3}\s*%)"),
        ]);

        m.insert(FieldKey::Rse, vec![
            rx(r"(?i)(?:crit[èe]re\s+)?(?:RSE|environnemental|d[ée]veloppement\s+durable)\s*:?\s*(\d{1,3}\s*%)"),
            rx(r"(?i)\b(clause\s+(?:sociale|environnementale))\b"),
        ]);

        m
    };
}
