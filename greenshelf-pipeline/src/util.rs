/// Last path segment of a type name, used as a component's log label.
///
/// `"greenshelf_pipeline::components::top_k_selector::TopKSelector"`
/// becomes `"TopKSelector"`. Generic arguments are dropped as well.
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_module_path_and_generics() {
        assert_eq!(short_type_name("a::b::WasteRiskScorer"), "WasteRiskScorer");
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper");
        assert_eq!(short_type_name("Plain"), "Plain");
    }
}
