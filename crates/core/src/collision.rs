use std::collections::{BTreeSet, HashMap};
use types::{Association, ClassId, CourseId};

/// Course → enrolled classes, inverted once from the association list.
///
/// Read-only after [`CollisionIndex::build`]; every predicate evaluation and
/// every optimization round shares the same index.
#[derive(Clone, Debug, Default)]
pub struct CollisionIndex {
    classes_by_course: HashMap<CourseId, BTreeSet<ClassId>>,
}

impl CollisionIndex {
    pub fn build(associations: &[Association]) -> Self {
        let mut classes_by_course: HashMap<CourseId, BTreeSet<ClassId>> = HashMap::new();
        for a in associations {
            classes_by_course
                .entry(a.course.clone())
                .or_default()
                .insert(a.class.clone());
        }
        Self { classes_by_course }
    }

    pub fn classes_of(&self, course: &CourseId) -> Option<&BTreeSet<ClassId>> {
        self.classes_by_course.get(course)
    }

    /// True when some class attends both courses.
    pub fn collides(&self, a: &CourseId, b: &CourseId) -> bool {
        match (self.classes_by_course.get(a), self.classes_by_course.get(b)) {
            (Some(ca), Some(cb)) => !ca.is_disjoint(cb),
            _ => false,
        }
    }

    pub fn shared_classes<'a>(&'a self, a: &CourseId, b: &CourseId) -> Vec<&'a ClassId> {
        match (self.classes_by_course.get(a), self.classes_by_course.get(b)) {
            (Some(ca), Some(cb)) => ca.intersection(cb).collect(),
            _ => Vec::new(),
        }
    }

    pub fn course_count(&self) -> usize {
        self.classes_by_course.len()
    }
}
