//! Synthetic E-utilities payloads.

/// A minimal PMC full-text article. Pass `None` to leave a section out.
pub fn pmc_article(title: Option<&str>, abstract_text: Option<&str>, body: Option<&str>) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<pmc-articleset><article><front><article-meta>",
    );
    if let Some(t) = title {
        xml.push_str(&format!("<title-group><article-title>{t}</article-title></title-group>"));
    }
    if let Some(a) = abstract_text {
        xml.push_str(&format!("<abstract><p>{a}</p></abstract>"));
    }
    xml.push_str("</article-meta></front>");
    if let Some(b) = body {
        xml.push_str(&format!("<body><sec><p>{b}</p></sec></body>"));
    }
    xml.push_str("</article></pmc-articleset>\n");
    xml
}

/// An esearch result page listing `ids`.
pub fn esearch_response(count: usize, ids: &[&str]) -> String {
    let id_list: String = ids.iter().map(|id| format!("<Id>{id}</Id>")).collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<eSearchResult><Count>{count}</Count>\
         <RetMax>{}</RetMax><RetStart>0</RetStart><IdList>{id_list}</IdList></eSearchResult>\n",
        ids.len()
    )
}
