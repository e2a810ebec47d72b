use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

pub const SIGN_IN_FORM: &str = ".sign-in-form";
pub const RESUME_HEADER: &str = ".p-resume-header";
pub const CONTENT_BOX: &str = ".ibox";

const BASIC_PROFILE_HEADING: &str = "基本プロフィール";
const AMBITION_HEADING: &str = "3年後の目標や野望";
const CAREER_HEADING: &str = "職務経歴";
const AGE_LABEL: &str = "年齢";
const PREFERRED_LOCATION_LABEL: &str = "希望勤務地";
const PREFERRED_SALARY_LABEL: &str = "希望年収";
const NOT_FILLED_IN: [&str; 2] = ["未入力です", "未入力"];

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static BOX_SEL: Lazy<Selector> = Lazy::new(|| selector(CONTENT_BOX));
static HEADING_SEL: Lazy<Selector> = Lazy::new(|| selector(".c-heading-text"));
static PROFILE_ROW_SEL: Lazy<Selector> = Lazy::new(|| selector(".row.m-b"));
static CONTENT_ROW_SEL: Lazy<Selector> = Lazy::new(|| selector(".ibox-content .row"));
static LABEL_SEL: Lazy<Selector> = Lazy::new(|| selector(".font-bold"));
static VALUE_SEL: Lazy<Selector> = Lazy::new(|| selector(".col-lg-8"));
static PARAGRAPH_SEL: Lazy<Selector> = Lazy::new(|| selector(".ibox-content p"));
static TAG_SEL: Lazy<Selector> = Lazy::new(|| selector(".c-tag--s-rounded"));
static NARRATIVE_SEL: Lazy<Selector> = Lazy::new(|| selector(".markdown-style"));

/// Raw fields read from one profile page, before any analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedProfile {
    pub basic_info: BTreeMap<String, String>,
    pub age: String,
    pub ambition: String,
    pub skills: String,
    pub preferred_location: String,
    pub preferred_salary: String,
    pub career_text: String,
}

pub fn scrape_profile(html: &str) -> ScrapedProfile {
    let document = Html::parse_document(html);
    let boxes: Vec<ElementRef> = document.select(&BOX_SEL).collect();

    let basic_info = boxes
        .iter()
        .find(|b| heading_contains(b, BASIC_PROFILE_HEADING))
        .map(|b| read_basic_info(b))
        .unwrap_or_default();

    let ambition = boxes
        .iter()
        .find(|b| heading_contains(b, AMBITION_HEADING))
        .and_then(|b| first_text(b, &PARAGRAPH_SEL))
        .unwrap_or_default();

    let career_text = boxes
        .iter()
        .filter(|b| heading_contains(b, CAREER_HEADING))
        .filter_map(|b| first_text(b, &NARRATIVE_SEL))
        .filter(|text| !text.is_empty())
        .collect::<Vec<String>>()
        .join("\n\n");

    ScrapedProfile {
        age: basic_info.get(AGE_LABEL).cloned().unwrap_or_default(),
        basic_info,
        ambition,
        skills: collect_skills(&document).join(", "),
        preferred_location: labelled_value(&document, PREFERRED_LOCATION_LABEL).unwrap_or_default(),
        preferred_salary: labelled_value(&document, PREFERRED_SALARY_LABEL).unwrap_or_default(),
        career_text,
    }
}

/// Whether the page carries the given CSS landmark.
pub fn has_landmark(html: &str, css: &str) -> bool {
    let Ok(sel) = Selector::parse(css) else {
        return false;
    };
    Html::parse_document(html).select(&sel).next().is_some()
}

fn text_of(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_text(scope: &ElementRef, sel: &Selector) -> Option<String> {
    scope.select(sel).next().map(|el| text_of(&el))
}

fn heading_contains(container: &ElementRef, label: &str) -> bool {
    container
        .select(&HEADING_SEL)
        .next()
        .is_some_and(|heading| heading.text().collect::<String>().contains(label))
}

fn read_basic_info(container: &ElementRef) -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();
    for row in container.select(&PROFILE_ROW_SEL) {
        let (Some(label), Some(value)) = (first_text(&row, &LABEL_SEL), first_text(&row, &VALUE_SEL))
        else {
            continue;
        };

        if label.is_empty() || value.is_empty() || NOT_FILLED_IN.contains(&value.as_str()) {
            continue;
        }

        info.insert(label, value);
    }
    info
}

fn collect_skills(document: &Html) -> Vec<String> {
    let mut skills: Vec<String> = Vec::new();
    for tag in document.select(&TAG_SEL) {
        let text = text_of(&tag);
        if !text.is_empty() && !skills.contains(&text) {
            skills.push(text);
        }
    }
    skills
}

fn labelled_value(document: &Html, label: &str) -> Option<String> {
    document
        .select(&CONTENT_ROW_SEL)
        .find(|row| {
            row.select(&LABEL_SEL)
                .next()
                .is_some_and(|l| l.text().collect::<String>().contains(label))
        })
        .and_then(|row| first_text(&row, &VALUE_SEL))
}
