use super::selection::Selection;
use std::collections::HashMap;

/// Static per-atom metadata from the topology file.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomInfo {
    pub name: String,     // Atom name (e.g. "CA", "OW")
    pub res_name: String, // Residue name (e.g. "ALA", "SOL")
    pub res_id: i64,      // Residue sequence number
    pub chain: String,    // Chain identifier
    pub mass: f64,        // Atomic mass
}

/// Topology-derived metadata shared read-only by the whole analysis.
///
/// Holds the atom table, named index groups produced by the external
/// selection engine, and residue-level lookup tables derived once at
/// construction.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    atoms: Vec<AtomInfo>,
    groups: HashMap<String, Vec<usize>>,
    residue_ids: Vec<i64>,
    residue_atoms: HashMap<i64, Vec<usize>>,
}

impl Topology {
    pub fn new(atoms: Vec<AtomInfo>, groups: HashMap<String, Vec<usize>>) -> Self {
        let mut residue_ids = Vec::new();
        let mut residue_atoms: HashMap<i64, Vec<usize>> = HashMap::new();
        for (i, atom) in atoms.iter().enumerate() {
            if residue_ids.last() != Some(&atom.res_id) && !residue_atoms.contains_key(&atom.res_id)
            {
                residue_ids.push(atom.res_id);
            }
            residue_atoms.entry(atom.res_id).or_default().push(i);
        }

        Self {
            atoms,
            groups,
            residue_ids,
            residue_atoms,
        }
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn atom(&self, index: usize) -> Option<&AtomInfo> {
        self.atoms.get(index)
    }

    pub fn atoms(&self) -> &[AtomInfo] {
        &self.atoms
    }

    /// Residue ids in order of first appearance in the atom table.
    pub fn residue_ids(&self) -> &[i64] {
        &self.residue_ids
    }

    pub fn residue_atoms(&self, res_id: i64) -> &[usize] {
        self.residue_atoms
            .get(&res_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn residue_name(&self, res_id: i64) -> Option<&str> {
        self.residue_atoms(res_id)
            .first()
            .map(|&i| self.atoms[i].res_name.as_str())
    }

    pub fn residue_chain(&self, res_id: i64) -> Option<&str> {
        self.residue_atoms(res_id)
            .first()
            .map(|&i| self.atoms[i].chain.as_str())
    }

    /// Index of the C-alpha atom of a residue, if the residue has one.
    pub fn calpha_index(&self, res_id: i64) -> Option<usize> {
        self.residue_atoms(res_id)
            .iter()
            .copied()
            .find(|&i| self.atoms[i].name == "CA")
    }

    /// Resolve a named index group into a selection.
    pub fn selection(&self, group: &str) -> Option<Selection> {
        self.groups.get(group).map(|g| Selection::new(g.clone()))
    }

    /// Residues with at least one atom in the given selection, in topology
    /// order.
    pub fn residues_in_selection(&self, selection: &Selection) -> Vec<i64> {
        let mut seen = std::collections::HashSet::new();
        let mut residues = Vec::new();
        for idx in selection.iter() {
            let res_id = self.atoms[idx].res_id;
            if seen.insert(res_id) {
                residues.push(res_id);
            }
        }
        residues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(name: &str, res_name: &str, res_id: i64) -> AtomInfo {
        AtomInfo {
            name: name.to_string(),
            res_name: res_name.to_string(),
            res_id,
            chain: "A".to_string(),
            mass: 12.0,
        }
    }

    fn test_topology() -> Topology {
        let atoms = vec![
            atom("N", "ALA", 1),
            atom("CA", "ALA", 1),
            atom("C", "ALA", 1),
            atom("N", "GLY", 2),
            atom("CA", "GLY", 2),
        ];
        let mut groups = HashMap::new();
        groups.insert("pathway".to_string(), vec![0, 1, 2, 3, 4]);
        groups.insert("tail".to_string(), vec![3, 4]);
        Topology::new(atoms, groups)
    }

    #[test]
    fn residue_tables_are_derived_in_topology_order() {
        let top = test_topology();
        assert_eq!(top.residue_ids(), &[1, 2]);
        assert_eq!(top.residue_atoms(1), &[0, 1, 2]);
        assert_eq!(top.residue_name(2), Some("GLY"));
    }

    #[test]
    fn calpha_lookup_finds_ca_atom() {
        let top = test_topology();
        assert_eq!(top.calpha_index(1), Some(1));
        assert_eq!(top.calpha_index(2), Some(4));
        assert_eq!(top.calpha_index(3), None);
    }

    #[test]
    fn residues_in_selection_deduplicates_by_residue() {
        let top = test_topology();
        let sel = top.selection("tail").unwrap();
        assert_eq!(top.residues_in_selection(&sel), vec![2]);
    }

    #[test]
    fn unknown_group_yields_no_selection() {
        let top = test_topology();
        assert!(top.selection("nonexistent").is_none());
    }
}
