//! Integration tests for the render tree layout optimizer

use rstest::rstest;

use orgtree::domain::{
    optimize, DepthLimit, LayoutOptimizer, RenderAttributes, RenderTreeNode, SiblingGrouping,
};

fn member(id: &str) -> RenderTreeNode {
    RenderTreeNode::leaf(
        id.to_uppercase(),
        Some(RenderAttributes {
            id: Some(id.to_string()),
            role: Some("Dev".into()),
            ..Default::default()
        }),
    )
}

/// Root with `width` direct reports; the first report has a two-deep chain below it.
fn wide_tree(width: usize) -> RenderTreeNode {
    let reports: Vec<RenderTreeNode> = (0..width)
        .map(|i| {
            let node = member(&format!("r{i}"));
            if i == 0 {
                node.with_children(vec![
                    member("deep1").with_children(vec![member("deep2")])
                ])
            } else {
                node
            }
        })
        .collect();
    member("boss").with_children(reports)
}

#[test]
fn given_tree_when_optimizing_with_default_then_structure_is_unchanged() {
    let tree = wide_tree(5);

    let optimized = optimize(&tree);

    assert_eq!(optimized, tree);
}

#[rstest]
#[case::pass_through(LayoutOptimizer::new())]
#[case::grouping(LayoutOptimizer::new().with_strategy(SiblingGrouping::new(2)))]
#[case::depth(LayoutOptimizer::new().with_strategy(DepthLimit::new(1)))]
#[case::both(LayoutOptimizer::from_limits(Some(3), Some(2)))]
fn given_any_pipeline_when_optimizing_twice_then_result_is_stable_and_input_untouched(
    #[case] optimizer: LayoutOptimizer,
) {
    let tree = wide_tree(7);
    let snapshot = tree.clone();

    let once = optimizer.optimize(&tree);
    let twice = optimizer.optimize(&once);

    assert_eq!(once, twice);
    assert_eq!(tree, snapshot, "input must not be modified");
}

#[test]
fn given_wide_sibling_set_when_grouping_then_teams_hold_at_most_max() {
    let optimizer = LayoutOptimizer::new().with_strategy(SiblingGrouping::new(3));

    let optimized = optimizer.optimize(&wide_tree(7));

    let teams = optimized.children();
    let names: Vec<&str> = teams.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Team 1", "Team 2", "Team 3"]);
    assert!(teams.iter().all(RenderTreeNode::is_group));
    let sizes: Vec<usize> = teams.iter().map(|t| t.children().len()).collect();
    assert_eq!(sizes, vec![3, 3, 1]);
    assert_eq!(teams[0].attributes.as_ref().unwrap().member_count, Some(3));
    assert_eq!(optimized.member_descendants(), 9);
}

#[test]
fn given_small_sibling_set_when_grouping_then_no_team_is_inserted() {
    let optimizer = LayoutOptimizer::new().with_strategy(SiblingGrouping::new(10));
    let tree = wide_tree(4);

    assert_eq!(optimizer.optimize(&tree), tree);
}

#[test]
fn given_depth_limit_when_optimizing_then_deep_members_are_hidden_and_counted() {
    let optimizer = LayoutOptimizer::new().with_strategy(DepthLimit::new(1));

    let optimized = optimizer.optimize(&wide_tree(3));

    assert_eq!(optimized.depth(), 2);
    let cut = &optimized.children()[0];
    assert!(cut.is_leaf());
    assert_eq!(
        cut.attributes.as_ref().unwrap().hidden_descendants,
        Some(2)
    );
    assert_eq!(
        optimized.children()[1].attributes.as_ref().unwrap().hidden_descendants,
        None
    );
}

#[test]
fn given_limits_when_building_from_settings_then_strategies_are_ordered() {
    assert_eq!(LayoutOptimizer::from_limits(None, None).strategy_names(), vec!["pass-through"]);
    assert_eq!(
        LayoutOptimizer::from_limits(Some(5), Some(3)).strategy_names(),
        vec!["pass-through", "sibling-grouping", "depth-limit"]
    );
}
