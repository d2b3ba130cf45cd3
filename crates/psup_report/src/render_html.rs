//! crates/psup_report/src/render_html.rs
//! Offline, asset-free HTML rendering with an English/French phrasebook.

use std::fmt::Write as _;

use crate::model::DaySummary;

// ---------- Phrasebook ----------

#[derive(Copy, Clone)]
struct Phrase {
    key: &'static str,
    en: &'static str,
    fr: &'static str,
}

const PHRASES: &[Phrase] = &[
    Phrase { key: "title",        en: "Daily admission offers",   fr: "Propositions d'admission du jour" },
    Phrase { key: "day",          en: "Campaign day",             fr: "Jour de campagne" },
    Phrase { key: "gdd",          en: "Ordered-wish resignations active", fr: "Démissions automatiques sur vœux ordonnés actives" },
    Phrase { key: "responders",   en: "Auto-responder candidates", fr: "Candidats au répondeur automatique" },
    Phrase { key: "yes",          en: "yes",                      fr: "oui" },
    Phrase { key: "no",           en: "no",                       fr: "non" },
    Phrase { key: "statuses",     en: "Wishes by status",         fr: "Vœux par statut" },
    Phrase { key: "status",       en: "Status",                   fr: "Statut" },
    Phrase { key: "count",        en: "Count",                    fr: "Nombre" },
    Phrase { key: "activity",     en: "Today",                    fr: "Aujourd'hui" },
    Phrase { key: "offers",       en: "Offers of the day",        fr: "Propositions du jour" },
    Phrase { key: "auto_accepted", en: "Accepted by the auto-responder", fr: "Acceptées par le répondeur automatique" },
    Phrase { key: "res_awaiting", en: "Auto-responder resignations (waitlist)", fr: "Démissions du répondeur (liste d'attente)" },
    Phrase { key: "res_offers",   en: "Auto-responder resignations (offers)", fr: "Démissions du répondeur (propositions)" },
    Phrase { key: "res_gdd",      en: "Ordered-wish resignations", fr: "Démissions sur vœux ordonnés" },
    Phrase { key: "boarding",     en: "Boarding thresholds",      fr: "Barres d'internat" },
    Phrase { key: "group",        en: "Boarding group",           fr: "Internat" },
    Phrase { key: "capacity",     en: "Capacity",                 fr: "Capacité" },
    Phrase { key: "threshold",    en: "Threshold",                fr: "Barre" },
    Phrase { key: "maximum",      en: "Maximum",                  fr: "Maximum" },
    Phrase { key: "verification", en: "Verification",             fr: "Vérification" },
    Phrase { key: "clean",        en: "All checks passed.",       fr: "Toutes les vérifications sont passées." },
    Phrase { key: "alert",        en: "Alert: offers of the following groups are not exported", fr: "Alerte : les propositions des groupes suivants ne sont pas exportées" },
    Phrase { key: "warning",      en: "Warning: violations detected, no offer withheld", fr: "Avertissement : anomalies détectées, aucune proposition retenue" },
    Phrase { key: "stripped",     en: "Withheld offers",          fr: "Propositions retenues" },
    Phrase { key: "findings",     en: "Findings",                 fr: "Constats" },
    Phrase { key: "severity",     en: "Severity",                 fr: "Gravité" },
    Phrase { key: "code",         en: "Code",                     fr: "Code" },
    Phrase { key: "subject",      en: "Subject",                  fr: "Objet" },
    Phrase { key: "message",      en: "Message",                  fr: "Message" },
    Phrase { key: "digest",       en: "Input SHA-256",            fr: "SHA-256 de l'entrée" },
];

fn t(lang: &str, key: &str) -> &'static str {
    let fr = matches!(lang, "fr" | "fr-FR" | "fr_FR" | "fr-CA" | "fr_CA");
    PHRASES
        .iter()
        .find(|p| p.key == key)
        .map(|p| if fr { p.fr } else { p.en })
        .unwrap_or("?")
}

// ---------- Formatting helpers ----------

fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Thousands separated by a narrow no-break space (U+202F).
fn fmt_int(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('\u{202F}');
        }
        out.push(ch);
    }
    out
}

// ---------- HTML builder ----------

pub struct HtmlBuilder<'a> {
    lang: &'a str,
    buf: String,
}

impl<'a> HtmlBuilder<'a> {
    pub fn new(lang: &'a str) -> Self {
        Self { lang, buf: String::with_capacity(16 * 1024) }
    }

    pub fn start(&mut self, title: &str) {
        let _ = write!(
            self.buf,
            "<!doctype html><html lang=\"{}\"><head><meta charset=\"utf-8\">\
             <title>{}</title>\
             <style>\
             body{{font-family:system-ui,Arial,sans-serif;margin:24px;}}\
             h1,h2{{margin:0.3em 0;}}\
             .alert{{color:#a00;font-weight:bold}}\
             .warning{{color:#a60}}\
             table{{border-collapse:collapse}}\
             td,th{{padding:4px 8px;border-bottom:1px solid #ddd;text-align:left}}\
             </style></head><body><h1>{}</h1>",
            esc(self.lang),
            esc(title),
            esc(title)
        );
    }

    pub fn finish(mut self) -> String {
        self.buf.push_str("</body></html>\n");
        self.buf
    }

    fn kv(&mut self, key: &str, value: &str) {
        let _ = write!(self.buf, "<li><b>{}:</b> {}</li>", esc(t(self.lang, key)), esc(value));
    }

    fn table_head(&mut self, keys: &[&str]) {
        self.buf.push_str("<table><tr>");
        for k in keys {
            let _ = write!(self.buf, "<th>{}</th>", esc(t(self.lang, k)));
        }
        self.buf.push_str("</tr>");
    }

    fn table_row(&mut self, cells: &[String]) {
        self.buf.push_str("<tr>");
        for c in cells {
            let _ = write!(self.buf, "<td>{}</td>", esc(c));
        }
        self.buf.push_str("</tr>");
    }

    pub fn section_overview(&mut self, s: &DaySummary) {
        let yes_no = |b: bool| t(self.lang, if b { "yes" } else { "no" });
        let gdd = yes_no(s.gdd_active);
        self.buf.push_str("<ul>");
        self.kv("day", &s.day.to_string());
        self.kv("gdd", gdd);
        self.kv("responders", &fmt_int(s.responder_candidates));
        self.buf.push_str("</ul>");
    }

    pub fn section_activity(&mut self, s: &DaySummary) {
        let _ = write!(self.buf, "<h2>{}</h2><ul>", esc(t(self.lang, "activity")));
        self.kv("offers", &fmt_int(s.offers_of_the_day));
        self.kv("auto_accepted", &fmt_int(s.auto_accepted));
        self.kv("res_awaiting", &fmt_int(s.resignations.responder_awaiting));
        self.kv("res_offers", &fmt_int(s.resignations.responder_offers));
        self.kv("res_gdd", &fmt_int(s.resignations.gdd));
        self.buf.push_str("</ul>");
    }

    pub fn section_statuses(&mut self, s: &DaySummary) {
        let _ = write!(self.buf, "<h2>{}</h2>", esc(t(self.lang, "statuses")));
        self.table_head(&["status", "count"]);
        for c in s.nonzero_status_counts() {
            self.table_row(&[c.status.clone(), fmt_int(c.count)]);
        }
        self.buf.push_str("</table>");
    }

    pub fn section_boarding(&mut self, s: &DaySummary) {
        if s.thresholds.is_empty() {
            return;
        }
        let _ = write!(self.buf, "<h2>{}</h2>", esc(t(self.lang, "boarding")));
        self.table_head(&["group", "capacity", "threshold", "maximum"]);
        for r in &s.thresholds {
            self.table_row(&[
                r.boarding_group.clone(),
                r.capacity.to_string(),
                r.threshold.to_string(),
                r.maximum.to_string(),
            ]);
        }
        self.buf.push_str("</table>");
    }

    pub fn section_verification(&mut self, s: &DaySummary) {
        let _ = write!(self.buf, "<h2>{}</h2>", esc(t(self.lang, "verification")));
        let v = &s.verdict;
        if v.alert {
            let _ = write!(
                self.buf,
                "<p class=\"alert\">{}: {}</p>",
                esc(t(self.lang, "alert")),
                esc(&v.excluded_groups.join(" "))
            );
            self.buf.push_str("<ul>");
            self.kv("stripped", &fmt_int(v.stripped_offers));
            self.buf.push_str("</ul>");
        } else if v.warning {
            let _ = write!(self.buf, "<p class=\"warning\">{}</p>", esc(t(self.lang, "warning")));
        } else {
            let _ = write!(self.buf, "<p>{}</p>", esc(t(self.lang, "clean")));
        }
        if !s.findings.is_empty() {
            let _ = write!(self.buf, "<h2>{}</h2>", esc(t(self.lang, "findings")));
            self.table_head(&["severity", "code", "subject", "message"]);
            for f in &s.findings {
                self.table_row(&[f.severity.clone(), f.code.clone(), f.subject.clone(), f.message.clone()]);
            }
            self.buf.push_str("</table>");
        }
        if let Some(d) = &s.input_sha256 {
            let _ = write!(self.buf, "<p><small>{}: <code>{}</code></small></p>", esc(t(self.lang, "digest")), esc(d));
        }
    }
}

pub fn render_html(summary: &DaySummary, lang: &str) -> String {
    let mut h = HtmlBuilder::new(lang);
    h.start(t(lang, "title"));
    h.section_overview(summary);
    h.section_activity(summary);
    h.section_statuses(summary);
    h.section_boarding(summary);
    h.section_verification(summary);
    h.finish()
}
