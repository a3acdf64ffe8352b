mod trie_dict;
