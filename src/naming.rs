// Copyright 2025 Webmobix Solutions AG
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUTHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tab-name disambiguation against the set of names already in a spreadsheet.

/// Produces a tab name that does not collide with any existing name,
/// appending the next available `_<n>` suffix when needed.
///
/// Matching is case-insensitive. If no existing name equals `desired`, the
/// name is returned unchanged. Otherwise every existing name that is either
/// a bare match (counted as suffix 0) or `desired_<integer>` contributes a
/// suffix number, and the result is `desired_{max + 1}`. Non-integer
/// suffixes after the underscore are ignored.
///
/// Uniqueness holds only against the snapshot passed in; a concurrent
/// caller creating tabs in the same spreadsheet can still collide.
pub fn disambiguate_tab_name(desired: &str, existing: &[String]) -> String {
    let desired_lower = desired.to_lowercase();
    let prefix_lower = format!("{desired_lower}_");

    if !existing
        .iter()
        .any(|name| name.to_lowercase() == desired_lower)
    {
        return desired.to_string();
    }

    let mut suffixes: Vec<u64> = Vec::new();
    for name in existing {
        let name_lower = name.to_lowercase();
        if name_lower == desired_lower {
            suffixes.push(0);
        } else if let Some(rest) = name_lower.strip_prefix(&prefix_lower)
            && let Ok(number) = rest.parse::<u64>()
        {
            suffixes.push(number);
        }
    }

    let next = suffixes.iter().max().copied().unwrap_or(0).saturating_add(1);
    format!("{desired}_{next}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn returns_desired_name_when_unused() {
        assert_eq!(disambiguate_tab_name("Sheet1", &[]), "Sheet1");
        assert_eq!(
            disambiguate_tab_name("Sheet1", &names(&["Other", "Sheet2"])),
            "Sheet1"
        );
    }

    #[test]
    fn bare_collision_yields_suffix_one() {
        assert_eq!(
            disambiguate_tab_name("Sheet1", &names(&["sheet1"])),
            "Sheet1_1"
        );
    }

    #[test]
    fn picks_max_existing_suffix_plus_one() {
        assert_eq!(
            disambiguate_tab_name("Sheet1", &names(&["Sheet1", "Sheet1_1", "Sheet1_3"])),
            "Sheet1_4"
        );
    }

    #[test]
    fn suffix_matching_is_case_insensitive() {
        assert_eq!(
            disambiguate_tab_name("Data", &names(&["data", "DATA_2"])),
            "Data_3"
        );
    }

    #[test]
    fn non_integer_suffixes_are_ignored() {
        assert_eq!(
            disambiguate_tab_name("Sheet1", &names(&["Sheet1", "Sheet1_old", "Sheet1_2_draft"])),
            "Sheet1_1"
        );
    }

    #[test]
    fn suffix_at_u64_max_saturates_instead_of_overflowing() {
        let existing = names(&["Sheet1", &format!("Sheet1_{}", u64::MAX)]);
        assert_eq!(
            disambiguate_tab_name("Sheet1", &existing),
            format!("Sheet1_{}", u64::MAX)
        );
    }

    #[test]
    fn suffixed_names_alone_do_not_force_disambiguation() {
        // Without a bare match the desired name is free to use.
        assert_eq!(
            disambiguate_tab_name("Sheet1", &names(&["Sheet1_5"])),
            "Sheet1"
        );
    }
}
