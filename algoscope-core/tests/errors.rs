use algoscope_core::{
    Algorithm, AlgorithmFamily, ConfigError, DriverError, GraphKind, InvalidEdgeReason,
    PreconditionError, PreconditionErrorCode, Side, ValidationError, ValidationErrorCode,
    WorkbenchError, WorkbenchErrorCode,
};
use rstest::rstest;

#[rstest]
#[case(ValidationError::EmptyNodeId, ValidationErrorCode::EmptyNodeId)]
#[case(
    ValidationError::DuplicateNode { id: "A".to_owned() },
    ValidationErrorCode::DuplicateNode,
)]
#[case(
    ValidationError::InvalidEdge {
        from: "A".to_owned(),
        to: "A".to_owned(),
        reason: InvalidEdgeReason::SelfLoop,
    },
    ValidationErrorCode::InvalidEdge,
)]
#[case(
    ValidationError::NonNumericValue { raw: "x".to_owned() },
    ValidationErrorCode::NonNumericValue,
)]
#[case(ValidationError::DuplicateValue { value: 4 }, ValidationErrorCode::DuplicateValue)]
#[case(
    ValidationError::SlotOccupied { parent: 1, side: Side::Left },
    ValidationErrorCode::SlotOccupied,
)]
#[case(ValidationError::ParentNotFound { parent: 9 }, ValidationErrorCode::ParentNotFound)]
#[case(ValidationError::RootOccupied { root: 1 }, ValidationErrorCode::RootOccupied)]
fn returns_expected_validation_code(
    #[case] error: ValidationError,
    #[case] expected: ValidationErrorCode,
) {
    assert_eq!(error.code(), expected);
    assert!(error.code().as_str().starts_with("VALIDATION_"));
}

#[rstest]
#[case(PreconditionError::EmptyModel { model: "graph" }, PreconditionErrorCode::EmptyModel)]
#[case(PreconditionError::MissingStartNode, PreconditionErrorCode::MissingStartNode)]
#[case(
    PreconditionError::UnknownStartNode { id: "Z".to_owned() },
    PreconditionErrorCode::UnknownStartNode,
)]
#[case(
    PreconditionError::UnsupportedGraphKind {
        algorithm: Algorithm::Prim,
        kind: GraphKind::Directed,
    },
    PreconditionErrorCode::UnsupportedGraphKind,
)]
#[case(
    PreconditionError::WrongModel {
        algorithm: Algorithm::Bfs,
        expected: "graph",
        actual: "tree",
    },
    PreconditionErrorCode::WrongModel,
)]
fn returns_expected_precondition_code(
    #[case] error: PreconditionError,
    #[case] expected: PreconditionErrorCode,
) {
    assert_eq!(error.code(), expected);
    assert!(error.code().as_str().starts_with("PRECONDITION_"));
}

#[rstest]
#[case(
    WorkbenchError::Busy { operation: "add a node" },
    WorkbenchErrorCode::Busy,
    None,
    None,
)]
#[case(
    WorkbenchError::from(ValidationError::EmptyNodeId),
    WorkbenchErrorCode::Validation,
    Some(ValidationErrorCode::EmptyNodeId),
    None,
)]
#[case(
    WorkbenchError::from(PreconditionError::MissingStartNode),
    WorkbenchErrorCode::Precondition,
    None,
    Some(PreconditionErrorCode::MissingStartNode),
)]
#[case(
    WorkbenchError::from(DriverError::AlreadyRunning { run: 1 }),
    WorkbenchErrorCode::Driver,
    None,
    None,
)]
#[case(
    WorkbenchError::LockPoisoned { resource: "workbench" },
    WorkbenchErrorCode::LockPoisoned,
    None,
    None,
)]
fn returns_expected_workbench_code(
    #[case] error: WorkbenchError,
    #[case] expected: WorkbenchErrorCode,
    #[case] validation: Option<ValidationErrorCode>,
    #[case] precondition: Option<PreconditionErrorCode>,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.validation_code(), validation);
    assert_eq!(error.precondition_code(), precondition);
}

#[rstest]
#[case(
    ValidationError::InvalidEdge {
        from: "A".to_owned(),
        to: "B".to_owned(),
        reason: InvalidEdgeReason::Duplicate,
    },
    "cannot add edge A-B: the edge already exists",
)]
#[case(
    ValidationError::SlotOccupied { parent: 10, side: Side::Right },
    "the right child of 10 is already occupied",
)]
fn validation_messages_name_the_input(#[case] error: ValidationError, #[case] expected: &str) {
    assert_eq!(error.to_string(), expected);
}

#[test]
fn zero_delay_names_the_family() {
    let error = ConfigError::ZeroDelay {
        family: AlgorithmFamily::SpanningTree,
    };
    assert_eq!(
        error.to_string(),
        "the spanning-tree step delay must be greater than zero"
    );
}
